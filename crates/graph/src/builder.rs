use crate::layout::LayoutOptions;
use crate::validator::{self, Validation};
use extract::{ExtractionResult, Node, Relationship};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Which extracted nodes end up in the rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Only endpoints of at least one valid relationship
    #[default]
    ConnectedOnly,
    /// Every extracted node, isolated ones included
    AllNodes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub label: String,
    /// Category used for colouring and the filter menu
    pub group: String,
    /// Hover text
    pub title: String,
}

impl Vertex {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.id.clone(),
            group: node.node_type.clone(),
            title: node.node_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Renderable directed multigraph plus its layout configuration.
#[derive(Debug, Clone, Default)]
pub struct GraphArtifact {
    graph: DiGraph<Vertex, Edge>,
    id_to_idx: HashMap<String, NodeIndex>,
    layout: LayoutOptions,
}

impl GraphArtifact {
    pub fn new(layout: LayoutOptions) -> Self {
        Self {
            graph: DiGraph::new(),
            id_to_idx: HashMap::new(),
            layout,
        }
    }

    /// Insert a vertex; adding an id that is already present is a no-op.
    pub fn add_vertex(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(&idx) = self.id_to_idx.get(&vertex.id) {
            return idx;
        }

        let id = vertex.id.clone();
        let idx = self.graph.add_node(vertex);
        self.id_to_idx.insert(id, idx);
        idx
    }

    /// Insert a directed edge between two existing vertices.
    ///
    /// Returns `None` and leaves the graph untouched when either endpoint
    /// is not a vertex.
    pub fn add_edge(&mut self, source: &str, target: &str, label: &str) -> Option<EdgeIndex> {
        let (Some(&from), Some(&to)) = (self.id_to_idx.get(source), self.id_to_idx.get(target))
        else {
            return None;
        };

        Some(self.graph.add_edge(
            from,
            to,
            Edge {
                source: source.to_string(),
                target: target.to_string(),
                label: label.to_string(),
            },
        ))
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.id_to_idx.contains_key(id)
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Distinct vertex groups, sorted
    pub fn groups(&self) -> BTreeSet<&str> {
        self.vertices().map(|v| v.group.as_str()).collect()
    }

    /// Number of edges touching a vertex, in either direction
    pub fn degree(&self, id: &str) -> usize {
        self.id_to_idx.get(id).map_or(0, |&idx| {
            self.graph.edges_directed(idx, Direction::Outgoing).count()
                + self.graph.edges_directed(idx, Direction::Incoming).count()
        })
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutOptions) {
        self.layout = layout;
    }
}

#[derive(Serialize)]
struct ArtifactView<'a> {
    vertices: Vec<&'a Vertex>,
    edges: Vec<&'a Edge>,
    layout: &'a LayoutOptions,
}

impl Serialize for GraphArtifact {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ArtifactView {
            vertices: self.vertices().collect(),
            edges: self.edges().collect(),
            layout: &self.layout,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    layout: LayoutOptions,
    mode: RenderMode,
}

impl GraphBuilder {
    pub fn new(layout: LayoutOptions) -> Self {
        Self {
            layout,
            mode: RenderMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Build the artifact from already-validated parts.
    ///
    /// Vertices are inserted in sorted id order. Ids without a node and
    /// edges with a missing endpoint are skipped, so the builder is safe to
    /// call on unvalidated input.
    pub fn build(
        &self,
        nodes_by_id: &HashMap<String, Node>,
        valid_node_ids: &BTreeSet<String>,
        valid_edges: &[Relationship],
    ) -> GraphArtifact {
        let mut artifact = GraphArtifact::new(self.layout);

        for id in valid_node_ids {
            match nodes_by_id.get(id) {
                Some(node) => {
                    artifact.add_vertex(Vertex::from_node(node));
                }
                None => warn!(node_id = %id, "Skipping vertex without a node"),
            }
        }

        for rel in valid_edges {
            let label = rel.rel_type.to_lowercase();
            if artifact.add_edge(&rel.source, &rel.target, &label).is_none() {
                warn!(
                    source = %rel.source,
                    target = %rel.target,
                    label = %label,
                    "Skipping edge with missing endpoint"
                );
            }
        }

        debug!(
            vertices = artifact.vertex_count(),
            edges = artifact.edge_count(),
            "Built graph artifact"
        );
        artifact
    }

    /// Validate an extraction result and build it according to the render mode.
    pub fn build_from(&self, result: &ExtractionResult) -> (GraphArtifact, Validation) {
        let validation = validator::validate(&result.nodes, &result.relationships);
        let artifact = self.build_validated(result, &validation);
        (artifact, validation)
    }

    /// Build from a result whose validation has already been computed.
    pub fn build_validated(&self, result: &ExtractionResult, validation: &Validation) -> GraphArtifact {
        let nodes_by_id = validator::node_lookup(&result.nodes);

        match self.mode {
            RenderMode::ConnectedOnly => {
                self.build(&nodes_by_id, &validation.valid_node_ids, &validation.valid_edges)
            }
            RenderMode::AllNodes => {
                let all_ids: BTreeSet<String> = nodes_by_id.keys().cloned().collect();
                self.build(&nodes_by_id, &all_ids, &validation.valid_edges)
            }
        }
    }
}
