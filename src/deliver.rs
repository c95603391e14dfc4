//! Outbound report delivery over SMTP.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::config::DigestConfig;
use crate::error::DeliveryError;

/// Sends the finished HTML report to the configured recipient over
/// implicit-TLS SMTP.
pub struct ReportSender {
    smtp_host: String,
    smtp_port: u16,
    account: String,
    auth_code: SecretString,
    recipient: String,
}

impl ReportSender {
    pub fn from_config(config: &DigestConfig) -> Self {
        Self {
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            account: config.account.clone(),
            auth_code: config.auth_code.clone(),
            recipient: config.recipient.clone(),
        }
    }

    /// Deliver one HTML report. Blocking; run inside `spawn_blocking`
    /// from async code.
    pub fn send(&self, subject: &str, html_body: &str) -> Result<(), DeliveryError> {
        let message = Message::builder()
            .from(parse_mailbox(&self.account)?)
            .to(parse_mailbox(&self.recipient)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| DeliveryError::BuildFailed(e.to_string()))?;

        let creds = Credentials::new(
            self.account.clone(),
            self.auth_code.expose_secret().to_string(),
        );
        let transport = SmtpTransport::relay(&self.smtp_host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(self.smtp_port)
            .credentials(creds)
            .build();

        transport
            .send(&message)
            .map_err(|e| DeliveryError::SendFailed(e.to_string()))?;

        info!(to = %self.recipient, "report delivered");
        Ok(())
    }
}

fn parse_mailbox(addr: &str) -> Result<lettre::message::Mailbox, DeliveryError> {
    addr.parse().map_err(|e| DeliveryError::InvalidAddress {
        address: addr.to_string(),
        reason: format!("{e}"),
    })
}
