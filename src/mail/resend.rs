use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{MailError, Mailer, OutgoingEmail};

pub const RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Serialize, Debug, PartialEq)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    #[serde(skip_serializing_if = "no_addresses")]
    cc: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

fn no_addresses(addresses: &&[String]) -> bool {
    addresses.is_empty()
}

#[derive(Serialize, Debug, PartialEq)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

fn request_body(email: &OutgoingEmail) -> SendEmailRequest<'_> {
    SendEmailRequest {
        from: &email.from,
        to: &email.to,
        cc: &email.cc,
        subject: &email.subject,
        text: &email.text,
        attachments: email
            .attachments
            .iter()
            .map(|attachment| AttachmentPayload {
                filename: &attachment.filename,
                content: STANDARD.encode(&attachment.content),
            })
            .collect(),
    }
}

/// Client for the Resend email API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(http_client: Client, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: RESEND_API_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<String, MailError> {
        if email.to.iter().all(|address| address.trim().is_empty()) {
            return Err(MailError::NoRecipient);
        }

        let url = format!("{}/emails", self.base_url);
        debug!("Sending '{}' to {:?} via {}", email.subject, email.to, url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body(&email))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::EmailAttachment;
    use serde_json::json;

    #[test]
    fn test_request_body_encodes_attachments() {
        let email = OutgoingEmail {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            cc: vec!["admin@example.com".to_string()],
            subject: "Hola".to_string(),
            text: "cuerpo".to_string(),
            attachments: vec![EmailAttachment {
                filename: "Itinerario-1.pdf".to_string(),
                content: b"%PDF".to_vec(),
            }],
        };

        assert_eq!(
            serde_json::to_value(request_body(&email)).unwrap(),
            json!({
                "from": "a@example.com",
                "to": ["b@example.com"],
                "cc": ["admin@example.com"],
                "subject": "Hola",
                "text": "cuerpo",
                "attachments": [{ "filename": "Itinerario-1.pdf", "content": "JVBERg==" }]
            })
        );
    }

    #[test]
    fn test_request_body_omits_empty_lists() {
        let email = OutgoingEmail {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            cc: Vec::new(),
            subject: "Hola".to_string(),
            text: "cuerpo".to_string(),
            attachments: Vec::new(),
        };
        let value = serde_json::to_value(request_body(&email)).unwrap();
        assert!(value.get("cc").is_none());
        assert!(value.get("attachments").is_none());
    }

    #[tokio::test]
    async fn test_rejects_message_without_recipient() {
        let mailer = ResendMailer::new(Client::new(), "key").with_base_url("http://127.0.0.1:9");
        let email = OutgoingEmail {
            from: "a@example.com".to_string(),
            to: vec![" ".to_string()],
            cc: Vec::new(),
            subject: "Hola".to_string(),
            text: "cuerpo".to_string(),
            attachments: Vec::new(),
        };
        assert!(matches!(mailer.send(email).await, Err(MailError::NoRecipient)));
    }
}
