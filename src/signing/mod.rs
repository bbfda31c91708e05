//! Electronic signature requests.

pub mod docusign;

pub use docusign::{DocuSignClient, DocuSignConfig};

use async_trait::async_trait;
use log::warn;
use thiserror::Error;

pub const PLACEHOLDER_ENVELOPE_ID: &str = "placeholder-envelope-id";

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signature request failed: {0}")]
    Transport(String),
    #[error("signature API responded with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("signature API response had no envelope id")]
    MissingEnvelope,
}

/// Sends `document` to `email` for signing and returns the envelope id.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    async fn sign(&self, email: &str, document: &[u8]) -> Result<String, SigningError>;
}

/// Stand-in when no signature account is configured.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderSigner;

#[async_trait]
impl SignatureProvider for PlaceholderSigner {
    async fn sign(&self, email: &str, document: &[u8]) -> Result<String, SigningError> {
        warn!(
            "No signature provider configured, returning placeholder envelope for {} ({} bytes)",
            email,
            document.len()
        );
        Ok(PLACEHOLDER_ENVELOPE_ID.to_string())
    }
}
