use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenVerifier;
use crate::cms::StrapiClient;
use crate::config::{AppConfig, RendererKind};
use crate::contract::{DocumentRenderer, PdfRenderEngine, TypstRenderEngine};
use crate::mail::{DisabledMailer, Mailer, ResendMailer};
use crate::reserva::{Collaborators, ContractStaging, ReservationWorkflow};
use crate::signing::{DocuSignClient, PlaceholderSigner, SignatureProvider};

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ReservationWorkflow>,
    pub tokens: TokenVerifier,
    pub webhook_token: Option<String>,
}

impl AppState {
    pub fn new(workflow: ReservationWorkflow, tokens: TokenVerifier, webhook_token: Option<String>) -> Self {
        Self {
            workflow: Arc::new(workflow),
            tokens,
            webhook_token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .timeout(Duration::from_secs(60))
            .user_agent("sitios-reservas-server/1.0")
            .build()?;

        let strapi = Arc::new(StrapiClient::new(config.strapi.clone(), http_client.clone()));

        let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendMailer::new(http_client.clone(), key.clone())),
            None => {
                log::warn!("RESEND_API_KEY is not set, emails will not be sent");
                Arc::new(DisabledMailer)
            }
        };

        let signer: Arc<dyn SignatureProvider> = match (&config.docusign, config.workflow.enable_esign) {
            (Some(docusign), true) => Arc::new(DocuSignClient::new(docusign.clone(), http_client.clone())),
            _ => Arc::new(PlaceholderSigner),
        };

        let renderer: Arc<dyn DocumentRenderer> = match config.renderer {
            RendererKind::Pdf => Arc::new(PdfRenderEngine::default()),
            RendererKind::Typst => Arc::new(TypstRenderEngine::new(config.typst_bin.clone())),
        };

        let workflow = ReservationWorkflow::new(
            Collaborators {
                store: strapi.clone(),
                uploader: strapi,
                mailer,
                signer,
                renderer,
            },
            ContractStaging::new(config.staging_dir.clone(), config.cleanup_delay),
            config.workflow.clone(),
        );

        Ok(Self::new(
            workflow,
            TokenVerifier::new(config.service_token.clone(), config.jwt_secret.clone()),
            config.webhook_token.clone(),
        ))
    }
}
