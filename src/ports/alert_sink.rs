use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build error: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("{failed} of {total} sinks failed: {first}")]
    Partial {
        failed: usize,
        total: usize,
        first: String,
    },
}

/// Port for delivering a notification
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Short name used in logs ("email", "log", ...)
    fn name(&self) -> &'static str;

    async fn notify(&self, subject: &str, body: &str) -> Result<(), AlertError>;
}
