//! Confirmation senders: SMTP via lettre, or a log-only fallback.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::config::SmtpConfig;
use crate::error::NotifyError;

/// Subject line of every confirmation.
pub const CONFIRMATION_SUBJECT: &str = "Form Submission Confirmation";

/// Outbound notification sender.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends mail through an SMTP relay.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from_address)?;
        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        info!(host = %config.host, port = config.port, "SMTP notifier configured");
        Ok(Self { transport, from })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.build_message(to, subject, body)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport is blocking.
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| NotifyError::Transport(format!("send task failed: {e}")))?
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        debug!(to = to, "Confirmation mail sent");
        Ok(())
    }
}

/// Writes the message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(to = to, subject = subject, "Confirmation (SMTP disabled):\n{}", body);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
