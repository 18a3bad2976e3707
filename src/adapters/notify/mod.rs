mod email;
mod fanout;
mod log;
mod webhook;

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{AlertError, AlertSink};

pub use email::{SmtpAlertSink, SmtpConfig};
pub use fanout::FanoutAlertSink;
pub use log::LogAlertSink;
pub use webhook::WebhookAlertSink;

/// Pick the sink for this run: email when configured, otherwise log-only,
/// plus the webhook when a URL is set.
pub fn build_alert_sink(
    email: Option<&SmtpConfig>,
    webhook_url: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn AlertSink>, AlertError> {
    let primary: Arc<dyn AlertSink> = match email {
        Some(config) => Arc::new(SmtpAlertSink::new(config)?),
        None => Arc::new(LogAlertSink::new()),
    };

    match webhook_url {
        None => Ok(primary),
        Some(url) => {
            let webhook: Arc<dyn AlertSink> = Arc::new(WebhookAlertSink::new(url, timeout)?);
            Ok(Arc::new(FanoutAlertSink::new(vec![primary, webhook])))
        }
    }
}
