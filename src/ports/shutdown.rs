use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("Shutdown command is empty")]
    EmptyCommand,

    #[error("Failed to spawn shutdown command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Shutdown command exited with {0}")]
    ExitStatus(String),

    #[error("Shutdown command timed out after {0:?}")]
    Timeout(Duration),
}

/// Port for the irreversible host shutdown.
///
/// Implementations must be idempotent: a request made while another one is
/// in flight, or after one succeeded, is a no-op returning `Ok(())`.
#[async_trait]
pub trait ShutdownAction: Send + Sync {
    async fn shutdown(&self, reason: &str) -> Result<(), ShutdownError>;
}
