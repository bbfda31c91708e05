//! Process configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cms::StrapiConfig;
use crate::contract::ContractSettings;
use crate::mail::DEFAULT_SENDER;
use crate::reserva::staging::{DEFAULT_CLEANUP_DELAY, DEFAULT_STAGING_DIR};
use crate::reserva::workflow::DEFAULT_DOCUMENT_BASE_URL;
use crate::reserva::WorkflowSettings;
use crate::signing::DocuSignConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STRAPI_URL: &str = "http://localhost:1337";
pub const DEFAULT_DOCUSIGN_BASE_PATH: &str = "https://demo.docusign.net/restapi";
pub const DEFAULT_TYPST_BIN: &str = "typst";
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:1337", "http://localhost:3000"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be true or false, got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
    #[error("CONTRACT_RENDERER must be 'pdf' or 'typst', got '{0}'")]
    InvalidRenderer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Pdf,
    Typst,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub strapi: StrapiConfig,
    pub service_token: Option<String>,
    pub jwt_secret: Option<String>,
    pub webhook_token: Option<String>,
    pub resend_api_key: Option<String>,
    pub docusign: Option<DocuSignConfig>,
    pub renderer: RendererKind,
    pub typst_bin: String,
    pub staging_dir: PathBuf,
    pub cleanup_delay: Duration,
    pub cors_origins: Vec<String>,
    pub workflow: WorkflowSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };
        let cleanup_delay = match var("CONTRACT_TMP_CLEANUP_MS") {
            Some(value) => Duration::from_millis(value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "CONTRACT_TMP_CLEANUP_MS",
                value,
            })?),
            None => DEFAULT_CLEANUP_DELAY,
        };
        let renderer = match var("CONTRACT_RENDERER").map(|v| v.to_lowercase()) {
            None => RendererKind::Pdf,
            Some(v) if v == "pdf" => RendererKind::Pdf,
            Some(v) if v == "typst" => RendererKind::Typst,
            Some(v) => return Err(ConfigError::InvalidRenderer(v)),
        };

        let enable_esign = flag("ENABLE_DOCUSIGN", var("ENABLE_DOCUSIGN"))?;
        let docusign = match (var("DOCUSIGN_ACCESS_TOKEN"), var("DOCUSIGN_ACCOUNT_ID")) {
            (Some(access_token), Some(account_id)) => Some(DocuSignConfig {
                base_path: var("DOCUSIGN_BASE_PATH").unwrap_or_else(|| DEFAULT_DOCUSIGN_BASE_PATH.to_string()),
                access_token,
                account_id,
            }),
            _ => None,
        };
        if enable_esign && docusign.is_none() {
            log::warn!("ENABLE_DOCUSIGN is set without DocuSign credentials, envelopes will be placeholders");
        }

        let mut strapi = StrapiConfig::new(var("STRAPI_URL").unwrap_or_else(|| DEFAULT_STRAPI_URL.to_string()));
        strapi.api_token = var("STRAPI_API_TOKEN");
        strapi.user_token = var("STRAPI_USER_TOKEN");
        strapi.admin_token = var("STRAPI_ADMIN_TOKEN");

        let mut contract = ContractSettings::default();
        if let Some(year_text) = var("CONTRACT_YEAR_TEXT") {
            contract.year_text = year_text;
        }

        let cors_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            strapi,
            service_token: var("SERVICE_TOKEN"),
            jwt_secret: var("JWT_SECRET"),
            webhook_token: var("WEBHOOK_TOKEN"),
            resend_api_key: var("RESEND_API_KEY"),
            docusign,
            renderer,
            typst_bin: var("TYPST_BIN").unwrap_or_else(|| DEFAULT_TYPST_BIN.to_string()),
            staging_dir: var("CONTRACT_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR)),
            cleanup_delay,
            cors_origins,
            workflow: WorkflowSettings {
                contract,
                mail_from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_SENDER.to_string()),
                admin_email: var("ADMIN_EMAIL"),
                enable_esign,
                document_base_url: var("DOCUMENT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_DOCUMENT_BASE_URL.to_string()),
                send_confirmation_email: flag("SEND_CONFIRMATION_EMAIL", var("SEND_CONFIRMATION_EMAIL"))?,
                notify_on_create: flag("NOTIFY_ON_CREATE", var("NOTIFY_ON_CREATE"))?,
            },
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}
