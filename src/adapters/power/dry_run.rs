use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::warn;

use crate::ports::{ShutdownAction, ShutdownError};

/// Logs the shutdown instead of performing it
#[derive(Debug, Default)]
pub struct DryRunShutdown {
    requested: AtomicBool,
}

impl DryRunShutdown {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShutdownAction for DryRunShutdown {
    async fn shutdown(&self, reason: &str) -> Result<(), ShutdownError> {
        if !self.requested.swap(true, Ordering::SeqCst) {
            warn!("Dry run: host would shut down now ({})", reason);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_never_fails() {
        let action = DryRunShutdown::new();
        assert!(action.shutdown("too hot").await.is_ok());
        assert!(action.shutdown("too hot").await.is_ok());
        assert!(action.requested.load(Ordering::SeqCst));
    }
}
