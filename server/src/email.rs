//! Outbound email delivery for contact-form submissions.
//!
//! The gateway talks to [`Mailer`], never to SMTP directly; the trait is
//! the seam where tests substitute a mock and where a different provider
//! could be slotted in.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;
use crate::retry::{with_backoff, Backoff};

/// Upper bound on one delivery attempt, retries included. The gateway
/// reports a delivery failure rather than hanging the caller.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MailerError {
    /// Server-side misconfiguration (missing relay or recipient). Raised
    /// at startup, never from a request.
    #[error("mailer is not configured: {0}")]
    Config(String),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("delivery timed out")]
    Timeout,
}

/// A fully sanitized message ready for delivery. Construction from raw
/// input happens upstream in the gateway; nothing here re-validates.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub subject: String,
    pub body: String,
    /// Sanitized submitter address, set as Reply-To so staff can answer
    /// directly.
    pub reply_to: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError>;
}

/// SMTP-backed [`Mailer`] with retry and a hard send timeout.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailerError> {
        if config.host.is_empty() {
            return Err(MailerError::Config("SMTP_HOST is not set".to_owned()));
        }
        if config.recipient.is_empty() {
            return Err(MailerError::Config(
                "CONTACT_RECIPIENT is not set".to_owned(),
            ));
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build::<Tokio1Executor>();

        Ok(Self {
            transport,
            from: config.user.clone(),
            to: config.recipient.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailerError> {
        let OutboundEmail {
            subject,
            body,
            reply_to,
        } = email;

        let mut builder = Message::builder()
            .from(self.from.parse()?)
            .to(self.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = reply_to {
            // The address was validated upstream; an unparsable one just
            // loses the Reply-To convenience rather than the message.
            if let Ok(mailbox) = reply_to.parse() {
                builder = builder.reply_to(mailbox);
            }
        }
        let message = builder.body(body)?;

        let delivery = with_backoff("smtp_send", Backoff::delivery(), || {
            let message = message.clone();
            async move { self.transport.send(message).await }
        });

        match tokio::time::timeout(SEND_TIMEOUT, delivery).await {
            Ok(Ok(response)) => {
                info!(?response, "Email delivered");
                Ok(())
            }
            Ok(Err(err)) => Err(MailerError::Transport(err)),
            Err(_) => Err(MailerError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config(host: &str, recipient: &str) -> SmtpConfig {
        SmtpConfig {
            host: host.to_owned(),
            user: "forms@provira.example".to_owned(),
            password: "secret".to_owned(),
            recipient: recipient.to_owned(),
        }
    }

    #[test]
    fn missing_relay_host_is_a_config_error() {
        let result = SmtpMailer::from_config(&config("", "contact@provira.example"));
        assert_matches!(result, Err(MailerError::Config(msg)) if msg.contains("SMTP_HOST"));
    }

    #[test]
    fn missing_recipient_is_a_config_error() {
        let result = SmtpMailer::from_config(&config("smtp.example.com", ""));
        assert_matches!(result, Err(MailerError::Config(msg)) if msg.contains("CONTACT_RECIPIENT"));
    }

    #[test]
    fn complete_config_builds_a_mailer() {
        let mailer = SmtpMailer::from_config(&config("smtp.example.com", "contact@provira.example"));
        assert!(mailer.is_ok());
    }
}
