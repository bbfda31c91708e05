//! DocuSign eSignature REST adapter.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SignatureProvider, SigningError};

#[derive(Debug, Clone)]
pub struct DocuSignConfig {
    /// e.g. `https://demo.docusign.net/restapi`
    pub base_path: String,
    pub access_token: String,
    pub account_id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EnvelopeDefinition<'a> {
    email_subject: &'a str,
    documents: Vec<EnvelopeDocument>,
    recipients: Recipients<'a>,
    status: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EnvelopeDocument {
    document_base64: String,
    name: &'static str,
    file_extension: &'static str,
    document_id: &'static str,
}

#[derive(Serialize, Debug)]
struct Recipients<'a> {
    signers: Vec<Signer<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Signer<'a> {
    email: &'a str,
    name: &'static str,
    recipient_id: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeSummary {
    envelope_id: Option<String>,
}

fn envelope_definition<'a>(email: &'a str, document: &[u8]) -> EnvelopeDefinition<'a> {
    EnvelopeDefinition {
        email_subject: "Por favor firme su documento de reserva",
        documents: vec![EnvelopeDocument {
            document_base64: STANDARD.encode(document),
            name: "Contrato de Reserva",
            file_extension: "pdf",
            document_id: "1",
        }],
        recipients: Recipients {
            signers: vec![Signer {
                email,
                name: "Cliente",
                recipient_id: "1",
            }],
        },
        status: "sent",
    }
}

#[derive(Debug, Clone)]
pub struct DocuSignClient {
    config: DocuSignConfig,
    http_client: Client,
}

impl DocuSignClient {
    pub fn new(config: DocuSignConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn envelopes_url(&self) -> String {
        format!(
            "{}/v2.1/accounts/{}/envelopes",
            self.config.base_path.trim_end_matches('/'),
            self.config.account_id
        )
    }
}

#[async_trait]
impl SignatureProvider for DocuSignClient {
    async fn sign(&self, email: &str, document: &[u8]) -> Result<String, SigningError> {
        let url = self.envelopes_url();
        debug!("Creating envelope for {} at {}", email, url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&envelope_definition(email, document))
            .send()
            .await
            .map_err(|e| SigningError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SigningError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let summary: EnvelopeSummary = response
            .json()
            .await
            .map_err(|e| SigningError::Transport(e.to_string()))?;
        let envelope_id = summary
            .envelope_id
            .filter(|id| !id.is_empty())
            .ok_or(SigningError::MissingEnvelope)?;
        info!("Envelope {} sent to {}", envelope_id, email);
        Ok(envelope_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_definition_shape() {
        let value = serde_json::to_value(envelope_definition("ana@example.com", b"%PDF")).unwrap();
        assert_eq!(
            value,
            json!({
                "emailSubject": "Por favor firme su documento de reserva",
                "documents": [{
                    "documentBase64": "JVBERg==",
                    "name": "Contrato de Reserva",
                    "fileExtension": "pdf",
                    "documentId": "1"
                }],
                "recipients": { "signers": [{ "email": "ana@example.com", "name": "Cliente", "recipientId": "1" }] },
                "status": "sent"
            })
        );
    }

    #[test]
    fn test_envelopes_url() {
        let client = DocuSignClient::new(
            DocuSignConfig {
                base_path: "https://demo.docusign.net/restapi/".to_string(),
                access_token: "token".to_string(),
                account_id: "acc-1".to_string(),
            },
            Client::new(),
        );
        assert_eq!(
            client.envelopes_url(),
            "https://demo.docusign.net/restapi/v2.1/accounts/acc-1/envelopes"
        );
    }
}
