use crate::schema::ExtractionResult;
use std::collections::HashSet;
use tracing::debug;

/// Brings LLM output into a consistent shape and, when type lists are
/// given, keeps only the allowed node and relationship types.
pub struct SchemaNormalizer {
    /// Lower-cased allowed node types; empty means unconstrained
    allowed_nodes: HashSet<String>,
    /// Allowed relationship types in normalized form
    allowed_relationships: HashSet<String>,
}

impl SchemaNormalizer {
    pub fn new(allowed_nodes: &[String], allowed_relationships: &[String]) -> Self {
        Self {
            allowed_nodes: allowed_nodes.iter().map(|t| t.trim().to_lowercase()).collect(),
            allowed_relationships: allowed_relationships
                .iter()
                .map(|t| normalize_relationship_type(t))
                .collect(),
        }
    }

    pub fn unconstrained() -> Self {
        Self::new(&[], &[])
    }

    pub fn normalize(&self, mut result: ExtractionResult) -> ExtractionResult {
        for node in &mut result.nodes {
            node.id = normalize_id(&node.id);
            node.node_type = normalize_node_type(&node.node_type);
        }

        for rel in &mut result.relationships {
            rel.source = normalize_id(&rel.source);
            rel.target = normalize_id(&rel.target);
            rel.rel_type = normalize_relationship_type(&rel.rel_type);
        }

        result.nodes.retain(|n| !n.id.is_empty() && !n.node_type.is_empty());
        result
            .relationships
            .retain(|r| !r.source.is_empty() && !r.target.is_empty() && !r.rel_type.is_empty());

        self.filter_allowed(result)
    }

    // Relationships that lose an endpoint here are left for the validator
    fn filter_allowed(&self, mut result: ExtractionResult) -> ExtractionResult {
        if !self.allowed_nodes.is_empty() {
            let before = result.nodes.len();
            result
                .nodes
                .retain(|n| self.allowed_nodes.contains(&n.node_type.to_lowercase()));
            debug!(removed = before - result.nodes.len(), "Filtered disallowed node types");
        }

        if !self.allowed_relationships.is_empty() {
            let before = result.relationships.len();
            result
                .relationships
                .retain(|r| self.allowed_relationships.contains(&r.rel_type));
            debug!(
                removed = before - result.relationships.len(),
                "Filtered disallowed relationship types"
            );
        }

        result
    }
}

/// Trim and collapse inner whitespace
fn normalize_id(id: &str) -> String {
    id.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "organization" -> "Organization"
fn normalize_node_type(node_type: &str) -> String {
    let trimmed = node_type.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// "works for" -> "WORKS_FOR"
fn normalize_relationship_type(rel_type: &str) -> String {
    rel_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
