//! Unified error types surfaced by the runtime API.
//!
//! Faults raised on the worker reach consumers only through the snapshot
//! stream, so [`EngineError`] is `Clone` to fan out to every subscriber.
use thiserror::Error;

use craps_core::RoundError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("batch aborted after {completed} completed rounds")]
    BatchFaulted {
        completed: u64,
        #[source]
        source: RoundError,
    },

    #[error("simulation worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("simulation engine requires a tokio runtime")]
    NoRuntime,
}

impl EngineError {
    pub(crate) fn from_join(error: tokio::task::JoinError) -> Self {
        if error.is_panic() {
            let payload = error.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            EngineError::WorkerPanicked(message)
        } else {
            EngineError::WorkerPanicked(error.to_string())
        }
    }
}
