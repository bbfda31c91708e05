use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use super::model::LifecycleEntry;
use super::workflow::{CreateOutcome, UpdateOutcome};
use crate::auth::bearer_token;
use crate::cms::normalize::flatten;
use crate::cms::RESERVAS;
use crate::{AppState, ErrorResponse};

pub const ENTRY_CREATE: &str = "entry.create";
pub const ENTRY_UPDATE: &str = "entry.update";
const RESERVA_MODEL: &str = "reserva";

/// Envelope posted by the CMS webhook feature.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct WebhookEvent {
    #[schema(example = "entry.update")]
    pub event: String,
    #[serde(default)]
    #[schema(example = "reserva")]
    pub model: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub entry: Value,
}

impl WebhookEvent {
    pub fn is_reservation(&self) -> bool {
        self.model.as_deref() == Some(RESERVA_MODEL) || self.uid.as_deref() == Some(RESERVAS.uid)
    }

    /// The entry with any attribute envelope lifted. An unreadable entry
    /// counts as one without an id.
    pub fn lifecycle_entry(&self) -> LifecycleEntry {
        serde_json::from_value(flatten(self.entry.clone())).unwrap_or_else(|e| {
            warn!("Unreadable webhook entry for {}: {}", self.event, e);
            LifecycleEntry::default()
        })
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct WebhookResponse {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<UpdateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<String>,
}

impl WebhookResponse {
    fn ignored(event: &str, reason: impl Into<String>) -> Self {
        Self {
            event: event.to_string(),
            created: None,
            updated: None,
            ignored: Some(reason.into()),
        }
    }
}

fn webhook_authorized(req: &HttpRequest, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    bearer_token(req.headers())
        .map(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

#[utoipa::path(
    tag = "Webhooks",
    post,
    path = "/webhooks/reserva",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event processed or ignored, with the outcome"),
        (status = 401, description = "Missing or wrong webhook token", body = ErrorResponse)
    )
)]
pub async fn reserva_webhook(
    req: HttpRequest,
    event: web::Json<WebhookEvent>,
    state: web::Data<AppState>,
) -> impl Responder {
    if !webhook_authorized(&req, state.webhook_token.as_deref()) {
        warn!("Rejected webhook call for {}", event.event);
        return HttpResponse::Unauthorized()
            .json(ErrorResponse::unauthorized("Token de webhook inválido"));
    }

    let event = event.into_inner();
    if !event.is_reservation() {
        debug!("Ignoring webhook for model {:?}", event.model);
        return HttpResponse::Ok().json(WebhookResponse::ignored(&event.event, "not a reservation"));
    }

    let entry = event.lifecycle_entry();
    info!("Webhook {} for reservation {:?}", event.event, entry.id);
    let response = match event.event.as_str() {
        ENTRY_CREATE => WebhookResponse {
            event: event.event.clone(),
            created: Some(state.workflow.on_created(&entry).await),
            updated: None,
            ignored: None,
        },
        ENTRY_UPDATE => WebhookResponse {
            event: event.event.clone(),
            created: None,
            updated: Some(state.workflow.on_updated(&entry).await),
            ignored: None,
        },
        other => WebhookResponse::ignored(other, "unhandled event"),
    };
    HttpResponse::Ok().json(response)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/webhooks/reserva").route(web::post().to(reserva_webhook)));
}
