use graph::{GraphBuilder, LayoutOptions, RenderMode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAR_LIMIT: usize = 25_000;

/// Settings the orchestrator needs, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Texts longer than this many characters are rejected, never truncated
    pub char_limit: usize,
    pub render_mode: RenderMode,
    pub layout: LayoutOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            char_limit: DEFAULT_CHAR_LIMIT,
            render_mode: RenderMode::ConnectedOnly,
            layout: LayoutOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.char_limit == 0 {
            return Err("char_limit must be greater than 0".to_string());
        }
        if self.layout.spring_length <= 0.0 {
            return Err("layout.springLength must be positive".to_string());
        }
        Ok(())
    }

    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new(self.layout).with_mode(self.render_mode)
    }
}
