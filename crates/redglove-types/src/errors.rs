use thiserror::Error;

pub type Result<T, E = RedgloveError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum RedgloveError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("capture error: {0}")]
    Capture(String),
    #[error("vision error: {0}")]
    Vision(String),
    #[error("controller error: {0}")]
    Controller(String),
    #[error("orchestrator error: {0}")]
    Orchestrator(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
