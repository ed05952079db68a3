use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The LLM request failed or returned a non-success status
    #[error("LLM error: {0}")]
    Llm(String),

    /// The LLM reply was not a valid extraction result
    #[error("failed to parse extraction result: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}
