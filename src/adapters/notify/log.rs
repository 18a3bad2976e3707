use async_trait::async_trait;
use tracing::warn;

use crate::ports::{AlertError, AlertSink};

/// Fallback sink used when no email credentials are configured
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl LogAlertSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for LogAlertSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        warn!("[Email Alert] {}: {}", subject, body);
        Ok(())
    }
}
