//! Error types for the engine and its collaborators.

/// Settings store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Settings store unavailable: {0}")]
    Unavailable(String),
    #[error("Settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Evaluator refused or could not process a call.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("Evaluator rejected the request: {0}")]
    Rejected(String),
    #[error("Evaluator unavailable: {0}")]
    Unavailable(String),
}

/// Error surfaced by the engine façade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("Evaluator rejected rules: {0}")]
    EvaluatorRejected(#[from] EvaluatorError),
}
