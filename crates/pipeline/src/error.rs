use std::fmt;
use thiserror::Error;

/// Stages of one pipeline run. Every run moves forward through them once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Extracting,
    Validating,
    Building,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Extracting => "extracting",
            Stage::Validating => "validating",
            Stage::Building => "building",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a run. Dangling relationships and unrenderable
/// elements are recovered inside the graph crate and never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Empty, oversized or unreadable input; extraction was never attempted
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The extraction collaborator failed or produced nothing
    #[error("extraction failed: {0}")]
    ExtractionFailure(String),
}

impl PipelineError {
    /// The stage the run was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::UnsupportedInput(_) => Stage::Start,
            PipelineError::ExtractionFailure(_) => Stage::Extracting,
        }
    }
}

impl From<ingest::IngestError> for PipelineError {
    fn from(e: ingest::IngestError) -> Self {
        PipelineError::UnsupportedInput(e.to_string())
    }
}

impl From<extract::ExtractError> for PipelineError {
    fn from(e: extract::ExtractError) -> Self {
        PipelineError::ExtractionFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
