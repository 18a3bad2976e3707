use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::ports::{AlertError, AlertSink};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    source: &'static str,
    subject: &'a str,
    body: &'a str,
    sent_at: DateTime<Utc>,
}

/// Posts alerts as JSON to an HTTP endpoint
pub struct WebhookAlertSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlertSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl From<reqwest::Error> for AlertError {
    fn from(err: reqwest::Error) -> Self {
        AlertError::Http(err.to_string())
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let payload = WebhookPayload {
            source: env!("CARGO_PKG_NAME"),
            subject,
            body,
            sent_at: Utc::now(),
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        info!("Alert posted to webhook: {}", subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload {
            source: "hostguard",
            subject: "High CPU Usage Alert",
            body: "CPU usage is too high!",
            sent_at: Utc::now(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["source"], "hostguard");
        assert_eq!(json["subject"], "High CPU Usage Alert");
        assert!(json["sent_at"].is_string());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let sink = WebhookAlertSink::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            sink.notify("subject", "body").await,
            Err(AlertError::Http(_))
        ));
    }
}
