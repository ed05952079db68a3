pub mod error;
pub mod llm;
pub mod normalizer;
pub mod prompt;
pub mod schema;

pub use error::ExtractError;
pub use llm::OllamaClient;
pub use normalizer::SchemaNormalizer;
pub use schema::{ExtractionResult, Node, Properties, Relationship};

use async_trait::async_trait;
use tracing::{debug, info};

/// Input of one extraction call. Empty type lists leave the model
/// unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub text: &'a str,
    pub allowed_nodes: &'a [String],
    pub allowed_relationships: &'a [String],
}

impl<'a> ExtractionRequest<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            allowed_nodes: &[],
            allowed_relationships: &[],
        }
    }

    pub fn with_allowed(mut self, nodes: &'a [String], relationships: &'a [String]) -> Self {
        self.allowed_nodes = nodes;
        self.allowed_relationships = relationships;
        self
    }
}

/// Turns text into at most one extraction result.
///
/// `Ok(None)` means the collaborator produced nothing usable; a result is
/// never partial.
#[async_trait]
pub trait Extraction: Send + Sync {
    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<Option<ExtractionResult>, ExtractError>;
}

/// LLM-backed extractor talking to an Ollama server.
pub struct Extractor {
    llm_client: OllamaClient,
}

impl Extractor {
    pub fn new(llm_client: OllamaClient) -> Self {
        Self { llm_client }
    }

    pub fn model(&self) -> &str {
        self.llm_client.model()
    }

    /// Parse and normalize the model's JSON reply.
    pub fn parse_response(
        raw: &str,
        normalizer: &SchemaNormalizer,
    ) -> Result<Option<ExtractionResult>, ExtractError> {
        let result: ExtractionResult = serde_json::from_str(strip_code_fence(raw))?;
        let mut result = normalizer.normalize(result);

        let duplicates = result.dedup_nodes();
        if duplicates > 0 {
            debug!(duplicates, "Removed duplicate node ids");
        }

        if result.is_empty() {
            return Ok(None);
        }
        Ok(Some(result))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(OllamaClient::default())
    }
}

#[async_trait]
impl Extraction for Extractor {
    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<Option<ExtractionResult>, ExtractError> {
        let prompt = prompt::build_extraction_prompt(
            request.text,
            request.allowed_nodes,
            request.allowed_relationships,
        );

        let raw = self
            .llm_client
            .generate_json(&prompt)
            .await
            .map_err(|e| ExtractError::Llm(format!("{e:#}")))?;

        let normalizer =
            SchemaNormalizer::new(request.allowed_nodes, request.allowed_relationships);
        let result = Self::parse_response(&raw, &normalizer)?;

        if let Some(result) = &result {
            info!(
                nodes = result.nodes.len(),
                relationships = result.relationships.len(),
                "Extracted graph"
            );
        }
        Ok(result)
    }
}

/// Models occasionally wrap JSON in a markdown code block even in JSON mode
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let raw = r#"{
            "nodes": [
                {"id": "Ada", "type": "person"},
                {"id": "Acme", "type": "organization"},
                {"id": "Ada", "type": "person"}
            ],
            "relationships": [{"source": "Ada", "target": "Acme", "type": "works for"}]
        }"#;

        let result = Extractor::parse_response(raw, &SchemaNormalizer::unconstrained())
            .unwrap()
            .unwrap();

        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.nodes[1].node_type, "Organization");
        assert_eq!(result.relationships[0].rel_type, "WORKS_FOR");
    }

    #[test]
    fn test_fenced_response() {
        let raw = "```json\n{\"nodes\": [{\"id\": \"A\", \"type\": \"T\"}]}\n```";
        let result = Extractor::parse_response(raw, &SchemaNormalizer::unconstrained()).unwrap();
        assert_eq!(result.unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_noisy_reply_keeps_valid_entries() {
        let raw = r#"{
            "nodes": [
                {"id": "Ada", "type": "person"},
                {"id": "Charles"},
                {"id": "Acme", "type": "organization"}
            ],
            "relationships": [
                {"source": "Ada", "target": "Acme", "type": "works_for"},
                {"source": "Ada", "target": null, "type": "KNOWS"}
            ]
        }"#;

        let result = Extractor::parse_response(raw, &SchemaNormalizer::unconstrained())
            .unwrap()
            .unwrap();

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Ada", "Acme"]);
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].target, "Acme");
    }

    #[test]
    fn test_empty_reply_is_none() {
        let raw = r#"{"nodes": [], "relationships": []}"#;
        let result = Extractor::parse_response(raw, &SchemaNormalizer::unconstrained()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Extractor::parse_response("not json", &SchemaNormalizer::unconstrained())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn test_request_builder() {
        let nodes = vec!["Person".to_string()];
        let request = ExtractionRequest::new("hello").with_allowed(&nodes, &[]);
        assert_eq!(request.allowed_nodes, &nodes[..]);
        assert!(request.allowed_relationships.is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_maps_to_llm_error() {
        let extractor = Extractor::new(OllamaClient::new(
            "http://127.0.0.1:9".to_string(),
            "llama3".to_string(),
        ));
        let err = extractor
            .extract(&ExtractionRequest::new("Ada met Charles."))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Llm(_)));
    }
}
