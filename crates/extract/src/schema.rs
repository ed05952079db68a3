use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub type Properties = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, deserialize_with = "string_map")]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A typed edge between two node ids.
///
/// Endpoints are weak references: they may name ids that are not present in
/// the accompanying node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(deserialize_with = "endpoint_id")]
    pub source: String,
    #[serde(deserialize_with = "endpoint_id")]
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default, deserialize_with = "string_map")]
    pub properties: Properties,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        rel_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }
}

/// Nodes and relationships extracted from one text input.
///
/// Entries that do not parse (missing `type`, `null` endpoints, ...) are
/// skipped individually; the rest of the reply is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "lenient_list")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub relationships: Vec<Relationship>,
}

impl ExtractionResult {
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Drop nodes whose id was already seen; the first occurrence wins.
    /// Returns how many nodes were removed.
    pub fn dedup_nodes(&mut self) -> usize {
        let before = self.nodes.len();
        let mut seen = HashSet::new();
        self.nodes.retain(|node| seen.insert(node.id.clone()));
        before - self.nodes.len()
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let raw = raw.unwrap_or_default();
    let total = raw.len();

    let items: Vec<T> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if items.len() < total {
        debug!(skipped = total - items.len(), "Skipped malformed entries");
    }
    Ok(items)
}

// LLMs emit endpoints either as a bare id or as a full node object
#[derive(Deserialize)]
#[serde(untagged)]
enum Endpoint {
    Id(String),
    Number(serde_json::Number),
    Node {
        #[serde(deserialize_with = "scalar_string")]
        id: String,
    },
}

fn endpoint_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Endpoint::deserialize(deserializer)? {
        Endpoint::Id(id) => id,
        Endpoint::Number(n) => n.to_string(),
        Endpoint::Node { id } => id,
    })
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string id, found {other}"
        ))),
    }
}

/// Accept `null`, and stringify non-string property values.
fn string_map<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}
