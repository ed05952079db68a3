pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::PipelineConfig;
pub use error::{PipelineError, Stage};
pub use orchestrator::{Pipeline, PipelineOutput, StageTimings};
