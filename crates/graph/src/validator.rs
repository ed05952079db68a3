use extract::{Node, Relationship};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Relationships whose endpoints both exist, and the ids they touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// Retained relationships in input order; duplicates stay as parallel edges
    pub valid_edges: Vec<Relationship>,
    /// Union of the endpoints of `valid_edges`
    pub valid_node_ids: BTreeSet<String>,
    /// Number of relationships dropped for a dangling endpoint
    pub dropped: usize,
}

/// Keep only relationships whose source and target are both in `nodes`.
///
/// Dangling references are expected from a noisy extraction step: they are
/// dropped and counted, never reported as errors.
pub fn validate(nodes: &[Node], relationships: &[Relationship]) -> Validation {
    let lookup: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut validation = Validation::default();
    for rel in relationships {
        if lookup.contains_key(rel.source.as_str()) && lookup.contains_key(rel.target.as_str()) {
            validation.valid_node_ids.insert(rel.source.clone());
            validation.valid_node_ids.insert(rel.target.clone());
            validation.valid_edges.push(rel.clone());
        } else {
            debug!(
                source = %rel.source,
                target = %rel.target,
                rel_type = %rel.rel_type,
                "Dropping relationship with dangling endpoint"
            );
            validation.dropped += 1;
        }
    }

    validation
}

/// Index nodes by id. When an id repeats, the first node wins.
pub fn node_lookup(nodes: &[Node]) -> HashMap<String, Node> {
    let mut lookup = HashMap::with_capacity(nodes.len());
    for node in nodes {
        lookup.entry(node.id.clone()).or_insert_with(|| node.clone());
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (Vec<Node>, Vec<Relationship>) {
        let nodes = vec![
            Node::new("A", "Person"),
            Node::new("B", "Person"),
            Node::new("C", "Org"),
        ];
        let rels = vec![
            Relationship::new("A", "WORKS_FOR", "C"),
            Relationship::new("A", "KNOWS", "X"),
        ];
        (nodes, rels)
    }

    #[test]
    fn test_dangling_relationship_is_dropped() {
        let (nodes, rels) = scenario();
        let validation = validate(&nodes, &rels);

        assert_eq!(validation.valid_edges, vec![Relationship::new("A", "WORKS_FOR", "C")]);
        assert_eq!(
            validation.valid_node_ids,
            BTreeSet::from(["A".to_string(), "C".to_string()])
        );
        assert_eq!(validation.dropped, 1);
    }

    #[test]
    fn test_empty_input() {
        let validation = validate(&[], &[]);
        assert!(validation.valid_edges.is_empty());
        assert!(validation.valid_node_ids.is_empty());
        assert_eq!(validation.dropped, 0);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let nodes = vec![Node::new("A", "T"), Node::new("B", "T"), Node::new("C", "T")];
        let rels = vec![
            Relationship::new("B", "R2", "C"),
            Relationship::new("Z", "R0", "A"),
            Relationship::new("A", "R1", "B"),
            Relationship::new("B", "R2", "C"),
        ];

        let validation = validate(&nodes, &rels);
        let types: Vec<_> = validation.valid_edges.iter().map(|r| r.rel_type.as_str()).collect();
        assert_eq!(types, vec!["R2", "R1", "R2"]);
    }

    #[test]
    fn test_referential_integrity_over_many_inputs() {
        let ids = ["A", "B", "C", "D", "E", "F"];
        // Only A, C and E exist
        let nodes: Vec<Node> = ids.iter().step_by(2).map(|id| Node::new(*id, "T")).collect();
        let node_ids: BTreeSet<String> = nodes.iter().map(|n| n.id.clone()).collect();

        let mut rels = Vec::new();
        for source in ids {
            for target in ids {
                rels.push(Relationship::new(source, "R", target));
            }
        }

        let validation = validate(&nodes, &rels);

        let endpoints: BTreeSet<String> = validation
            .valid_edges
            .iter()
            .flat_map(|r| [r.source.clone(), r.target.clone()])
            .collect();
        assert!(validation.valid_edges.iter().all(|r| {
            node_ids.contains(&r.source) && node_ids.contains(&r.target)
        }));
        assert!(validation.valid_node_ids.is_subset(&node_ids));
        assert_eq!(validation.valid_node_ids, endpoints);
        assert_eq!(validation.valid_edges.len(), 9);
        assert_eq!(validation.dropped, 27);
    }

    #[test]
    fn test_self_loop_is_valid() {
        let nodes = vec![Node::new("A", "T")];
        let validation = validate(&nodes, &[Relationship::new("A", "SELF", "A")]);
        assert_eq!(validation.valid_edges.len(), 1);
        assert_eq!(validation.valid_node_ids.len(), 1);
    }

    #[test]
    fn test_node_lookup_first_wins() {
        let nodes = vec![Node::new("A", "Person"), Node::new("A", "Org")];
        let lookup = node_lookup(&nodes);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup["A"].node_type, "Person");
    }
}
