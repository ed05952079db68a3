use graph::{RenderMode, RenderOptions};
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub render: RenderOptions,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("missing required setting {key}")]
    Missing { key: &'static str },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
            },
            llm: LlmConfig {
                base_url: extract::llm::DEFAULT_BASE_URL.to_string(),
                model: extract::llm::DEFAULT_MODEL.to_string(),
            },
            pipeline: PipelineConfig::default(),
            render: RenderOptions::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, starting from defaults.
    ///
    /// `CHAR_LIMIT` is required. Optional keys: `OLLAMA_BASE_URL`,
    /// `OLLAMA_MODEL`, `BIND_ADDR`, `RENDER_MODE`, `LOG_FORMAT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let raw = lookup("CHAR_LIMIT").ok_or(ConfigError::Missing { key: "CHAR_LIMIT" })?;
        config.pipeline.char_limit = parse_char_limit(&raw)?;
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            config.llm.model = model;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(raw) = lookup("RENDER_MODE") {
            config.pipeline.render_mode = match raw.trim() {
                "connected_only" => RenderMode::ConnectedOnly,
                "all_nodes" => RenderMode::AllNodes,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RENDER_MODE",
                        value: raw,
                        reason: "expected connected_only or all_nodes".to_string(),
                    });
                }
            };
        }
        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = match raw.trim() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "LOG_FORMAT",
                        value: raw,
                        reason: "expected pretty or json".to_string(),
                    });
                }
            };
        }

        Ok(config)
    }
}

fn parse_char_limit(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "CHAR_LIMIT",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be a positive integer")),
        Ok(limit) => Ok(limit),
        Err(e) => Err(invalid(&e.to_string())),
    }
}
