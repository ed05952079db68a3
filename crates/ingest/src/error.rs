use thiserror::Error;

/// Errors produced while turning a document into plain text.
///
/// An empty window is not an error: readers return an empty string for it.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed {format} document: {reason}")]
    Malformed { format: &'static str, reason: String },
}

impl IngestError {
    pub(crate) fn malformed(format: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            format,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
