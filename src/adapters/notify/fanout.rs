use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::error;

use crate::ports::{AlertError, AlertSink};

/// Delivers every alert to all inner sinks concurrently
pub struct FanoutAlertSink {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl FanoutAlertSink {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl AlertSink for FanoutAlertSink {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn notify(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let results = join_all(self.sinks.iter().map(|sink| sink.notify(subject, body))).await;

        let mut failures = Vec::new();
        for (sink, result) in self.sinks.iter().zip(results) {
            if let Err(e) = result {
                error!("Alert \"{}\" failed via {}: {}", subject, sink.name(), e);
                failures.push(format!("{}: {}", sink.name(), e));
            }
        }

        match failures.first() {
            None => Ok(()),
            Some(first) => Err(AlertError::Partial {
                failed: failures.len(),
                total: self.sinks.len(),
                first: first.clone(),
            }),
        }
    }
}
