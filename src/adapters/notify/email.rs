//! Alert delivery via SMTP.
//!
//! Every alert opens its own STARTTLS session, so a failed send is
//! attributable to exactly one alert.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::ports::{AlertError, AlertSink};

/// SMTP settings; the password is redacted from `Debug` output
#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub password: Option<String>,
    pub receiver: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("receiver", &self.receiver)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl From<lettre::address::AddressError> for AlertError {
    fn from(err: lettre::address::AddressError) -> Self {
        AlertError::Address(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AlertError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        AlertError::Transport(err.to_string())
    }
}

/// Sends alerts as plain-text email
pub struct SmtpAlertSink {
    from: Mailbox,
    to: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl SmtpAlertSink {
    /// Validates both addresses and prepares the transport. No connection
    /// is opened until the first alert.
    pub fn new(config: &SmtpConfig) -> Result<Self, AlertError> {
        let from: Mailbox = config.sender.parse()?;
        let to: Mailbox = config.receiver.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port);
        if let Some(password) = &config.password {
            builder = builder.credentials(Credentials::new(config.sender.clone(), password.clone()));
        }

        Ok(Self {
            from,
            to,
            mailer: builder.build(),
            timeout: config.timeout,
        })
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, AlertError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AlertError::Build(e.to_string()))
    }
}

#[async_trait]
impl AlertSink for SmtpAlertSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let email = self.message(subject, body)?;

        tokio::time::timeout(self.timeout, self.mailer.send(email))
            .await
            .map_err(|_| AlertError::Timeout(self.timeout))??;

        info!("Alert email sent to {}: {}", self.to, subject);
        Ok(())
    }
}
