//! Error types for pipeline construction and evaluation.

use thiserror::Error;

/// Result type alias using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Conditions raised while building or pulling from a pipeline.
///
/// Exhaustion is not an error: a finished stream simply returns `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Invalid construction arguments (zero window step, wrong `gseq` arity).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An element or method call did not supply usable arguments.
    #[error("bad arguments: {0}")]
    Argument(String),

    /// An element has no method of the requested name.
    #[error("'{type_name}' has no method '{method}'")]
    Attribute { type_name: String, method: String },

    /// Single-element access past the available values.
    #[error("index {index} out of range ({available} value(s) available)")]
    Index { index: isize, available: usize },

    /// A `generate` expression failed to produce a sequence.
    #[error("expression failed: {0}")]
    Expression(String),
}

impl PipelineError {
    pub fn arity(expected: usize, got: usize) -> Self {
        PipelineError::Argument(format!("expected {expected} argument(s), got {got}"))
    }

    pub fn attribute(type_name: &str, method: &str) -> Self {
        PipelineError::Attribute {
            type_name: type_name.to_string(),
            method: method.to_string(),
        }
    }
}
