use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Invalid Parameter: {0}")]
    InvalidParameter(String),

    #[error("A run is already in progress on this engine")]
    RunAlreadyInProgress,

    #[error("Sampling Failure: {0}")]
    SamplingFailure(String),

    #[error("Run cancelled after {completed} iterations")]
    Cancelled { completed: usize },

    #[error("Optimizer worker panicked")]
    WorkerPanicked,

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl OptimizerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

pub type GwoResult<T> = Result<T, OptimizerError>;
