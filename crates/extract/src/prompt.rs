pub fn build_extraction_prompt(
    text: &str,
    allowed_nodes: &[String],
    allowed_relationships: &[String],
) -> String {
    format!(
        r#"Extract a knowledge graph from the following text.

INSTRUCTIONS:
1. Identify the entities mentioned in the text as nodes
2. Extract the relationships between those nodes
3. Output ONLY valid JSON, nothing else
4. Use the exact schema below

SCHEMA:
{{
  "nodes": [
    {{"id": "Ada Lovelace", "type": "Person", "properties": {{"born": "1815"}}}}
  ],
  "relationships": [
    {{"source": "Ada Lovelace", "target": "Analytical Engine", "type": "WROTE_ABOUT", "properties": {{}}}}
  ]
}}

RULES:
- A node id is the entity's human-readable name, not a number
- Every relationship source and target must be the id of a node in "nodes"
- Node types are short capitalized nouns; relationship types are UPPER_SNAKE_CASE verbs
{}{}- Properties are optional string values; omit them when the text gives none
- Output ONLY the JSON object, no markdown, no explanations

TEXT:
{}

JSON OUTPUT:"#,
        allowed_rule("node types", allowed_nodes),
        allowed_rule("relationship types", allowed_relationships),
        text
    )
}

fn allowed_rule(kind: &str, allowed: &[String]) -> String {
    if allowed.is_empty() {
        return String::new();
    }
    format!("- Use ONLY these {}: {}\n", kind, allowed.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_prompt() {
        let prompt = build_extraction_prompt("Ada met Charles.", &[], &[]);
        assert!(prompt.contains("Ada met Charles."));
        assert!(!prompt.contains("Use ONLY these"));
    }

    #[test]
    fn test_allowed_types_are_listed() {
        let nodes = vec!["Person".to_string(), "Organization".to_string()];
        let rels = vec!["WORKS_FOR".to_string()];
        let prompt = build_extraction_prompt("text", &nodes, &rels);

        assert!(prompt.contains("- Use ONLY these node types: Person, Organization\n"));
        assert!(prompt.contains("- Use ONLY these relationship types: WORKS_FOR\n"));
    }
}
