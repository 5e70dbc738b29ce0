// Error kinds surfaced by the analysis core.
//
// Cleaning stages never produce these; they degrade to pass-through instead.
// Only input validation, model loading and inference can fail, and callers
// (CLI, web handlers) need to tell those three apart.

use thiserror::Error;

/// Errors that can occur while loading models or analyzing text.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Text is missing, empty, too long, or a graph payload is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A model (classifier or lemma table) could not be loaded. Fatal at startup.
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// A single inference call failed. The loaded model stays usable.
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl SentimentError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
