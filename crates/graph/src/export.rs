//! Row-oriented node and relationship tables for delimited-text export.
//!
//! Tables list everything the extraction produced, including isolated nodes
//! and dangling relationships that the rendered graph leaves out.

use extract::{ExtractionResult, Properties};
use serde::Serialize;

pub trait Table {
    fn headers(&self) -> &'static [&'static str];
    fn records(&self) -> Vec<Vec<String>>;

    /// Render with a header line; fields containing the delimiter, quotes or
    /// line breaks are quoted with doubled inner quotes.
    fn to_delimited(&self, delimiter: char) -> String {
        let mut out = String::new();
        push_record(&mut out, self.headers().iter().copied(), delimiter);
        for record in self.records() {
            push_record(&mut out, record.iter().map(String::as_str), delimiter);
        }
        out
    }

    fn to_csv(&self) -> String {
        self.to_delimited(',')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub properties: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeTable {
    pub rows: Vec<NodeRow>,
}

impl NodeTable {
    pub fn from_result(result: &ExtractionResult) -> Self {
        Self {
            rows: result
                .nodes
                .iter()
                .map(|n| NodeRow {
                    id: n.id.clone(),
                    node_type: n.node_type.clone(),
                    properties: format_properties(&n.properties),
                })
                .collect(),
        }
    }
}

impl Table for NodeTable {
    fn headers(&self) -> &'static [&'static str] {
        &["Node ID", "Type", "Properties"]
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![r.id.clone(), r.node_type.clone(), r.properties.clone()])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipRow {
    pub source: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub target: String,
    pub properties: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipTable {
    pub rows: Vec<RelationshipRow>,
}

impl RelationshipTable {
    pub fn from_result(result: &ExtractionResult) -> Self {
        Self {
            rows: result
                .relationships
                .iter()
                .map(|r| RelationshipRow {
                    source: r.source.clone(),
                    rel_type: r.rel_type.clone(),
                    target: r.target.clone(),
                    properties: format_properties(&r.properties),
                })
                .collect(),
        }
    }
}

impl Table for RelationshipTable {
    fn headers(&self) -> &'static [&'static str] {
        &["Source", "Relationship", "Target", "Properties"]
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.source.clone(),
                    r.rel_type.clone(),
                    r.target.clone(),
                    r.properties.clone(),
                ]
            })
            .collect()
    }
}

fn format_properties(properties: &Properties) -> String {
    // A BTreeMap of strings always serializes
    serde_json::to_string(properties).unwrap_or_default()
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>, delimiter: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if field.contains(delimiter) || field.contains(['"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{Node, Relationship};

    fn result() -> ExtractionResult {
        ExtractionResult::new(
            vec![
                Node::new("Ada", "Person").with_property("born", "1815"),
                Node::new("Acme, Inc", "Org"),
                Node::new("Lonely", "Person"),
            ],
            vec![
                Relationship::new("Ada", "WORKS_FOR", "Acme, Inc"),
                Relationship::new("Ada", "KNOWS", "Ghost"),
            ],
        )
    }

    #[test]
    fn test_node_table_lists_all_nodes() {
        let table = NodeTable::from_result(&result());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].properties, r#"{"born":"1815"}"#);
        assert_eq!(table.rows[2].properties, "{}");
    }

    #[test]
    fn test_node_csv() {
        let csv = NodeTable::from_result(&result()).to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Node ID,Type,Properties");
        assert_eq!(lines[1], r#"Ada,Person,"{""born"":""1815""}""#);
        assert_eq!(lines[2], r#""Acme, Inc",Org,{}"#);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_relationship_table_keeps_dangling() {
        let tsv = RelationshipTable::from_result(&result()).to_delimited('\t');
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(lines[0], "Source\tRelationship\tTarget\tProperties");
        assert_eq!(lines[1], "Ada\tWORKS_FOR\tAcme, Inc\t{}");
        assert_eq!(lines[2], "Ada\tKNOWS\tGhost\t{}");
    }

    #[test]
    fn test_multiline_field_is_quoted() {
        let result = ExtractionResult::new(vec![Node::new("two\nlines", "T")], vec![]);
        let csv = NodeTable::from_result(&result).to_csv();
        assert!(csv.contains("\"two\nlines\",T,{}\n"));
    }

    #[test]
    fn test_empty_tables_have_headers_only() {
        let empty = ExtractionResult::default();
        assert_eq!(NodeTable::from_result(&empty).to_csv(), "Node ID,Type,Properties\n");
        assert_eq!(
            RelationshipTable::from_result(&empty).to_csv(),
            "Source,Relationship,Target,Properties\n"
        );
    }
}
