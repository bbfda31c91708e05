//! Transactional email.

pub mod resend;
pub mod templates;

pub use resend::ResendMailer;

use async_trait::async_trait;
use log::info;
use thiserror::Error;

pub const DEFAULT_SENDER: &str = "Sitios Interes México <admin@sitiosdeinteresmexico.com>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery is not configured")]
    NotConfigured,
    #[error("no recipient address")]
    NoRecipient,
    #[error("mail request failed: {0}")]
    Transport(String),
    #[error("mail API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Sends one message and returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<String, MailError>;
}

/// Used when no mail API key is configured. Every send fails so callers
/// report it in their outcome.
#[derive(Debug, Default, Clone)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<String, MailError> {
        info!("Mail disabled, dropping '{}' to {:?}", email.subject, email.to);
        Err(MailError::NotConfigured)
    }
}
