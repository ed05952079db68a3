//! Plain-text extraction from uploaded documents with start/end windowing.

pub mod error;
pub mod format;
pub mod office;
pub mod pdf;
pub mod reader;
pub mod text;
pub mod window;

pub use error::IngestError;
pub use format::DocumentFormat;
pub use reader::DocumentReader;
pub use window::Window;
