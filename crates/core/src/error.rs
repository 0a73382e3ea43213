//! Error taxonomy for the response pipeline
//!
//! Each stage owns its own error type; the orchestrator wraps them into
//! [`PipelineError`] and decides between fallback and terminal propagation.

use thiserror::Error;

/// Language model failures.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// Remote overload ("retry later"). Retried inside the backend, never
    /// surfaced to the orchestrator.
    #[error("model overloaded: {0}")]
    Transient(String),

    /// Auth failure, malformed request, or an empty completion. Fails the
    /// call immediately without consuming remaining retries.
    #[error("model request rejected: {0}")]
    NonRetryable(String),

    /// All retry attempts were spent on transient failures.
    #[error("no completion after {attempts} attempts, last error: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl ModelError {
    /// Whether the backend may retry this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

/// Malformed model output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("model output is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("model output is not a JSON array")]
    NotAnArray,

    #[error("reply segment {0} has no text")]
    EmptyText(usize),
}

/// Speech backend failures.
#[derive(Error, Debug, Clone)]
pub enum SynthesisError {
    /// The vendor call itself failed (transport error or non-success status).
    #[error("speech vendor rejected request: {0}")]
    VendorRejected(String),

    /// The vendor call succeeded but the expected audio artifact is absent
    /// or unreadable.
    #[error("audio artifact missing: {0}")]
    ArtifactMissing(String),
}

/// Stage failure as seen by the orchestrator. Any of these routes the
/// request into the fallback flow.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Overall response deadline exceeded.
    #[error("response deadline of {0}ms exceeded")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelError::Transient("503".into()).is_transient());
        assert!(!ModelError::NonRetryable("401".into()).is_transient());
        assert!(!ModelError::RetriesExhausted {
            attempts: 3,
            last: "503".into()
        }
        .is_transient());
    }

    #[test]
    fn test_pipeline_error_wrapping() {
        let err: PipelineError = ParseError::NotAnArray.into();
        assert!(matches!(err, PipelineError::Parse(ParseError::NotAnArray)));

        let err: PipelineError = ModelError::NonRetryable("bad key".into()).into();
        assert_eq!(err.to_string(), "model request rejected: bad key");
    }
}
