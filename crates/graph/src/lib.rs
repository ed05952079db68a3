//! Validation, construction and rendering of knowledge graphs.

pub mod builder;
pub mod export;
pub mod layout;
pub mod render;
pub mod validator;

pub use builder::{Edge, GraphArtifact, GraphBuilder, RenderMode, Vertex};
pub use export::{NodeRow, NodeTable, RelationshipRow, RelationshipTable, Table};
pub use layout::LayoutOptions;
pub use render::{HtmlRenderer, RenderOptions};
pub use validator::{Validation, node_lookup, validate};
