use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::middleware::from_fn;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use serde::Deserialize;
use utoipa::ToSchema;

use super::model::Reservation;
use super::workflow::{CallOrigin, UploadOutcome, WorkflowError, PDF_CONTENT_TYPE};
use crate::auth::{require_contract_token, PrincipalExt};
use crate::{AppState, ErrorResponse};

/// `reservationId` as a number or a numeric string.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReservationIdInput {
    Number(i64),
    Text(String),
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct GenerateContractRequest {
    #[serde(rename = "reservationId", default)]
    #[schema(value_type = Option<i64>, example = 12)]
    pub reservation_id: Option<ReservationIdInput>,
}

impl GenerateContractRequest {
    /// The requested id. Zero, blank and non-numeric values count as missing.
    pub fn id(&self) -> Option<i64> {
        let id = match self.reservation_id.as_ref()? {
            ReservationIdInput::Number(id) => *id,
            ReservationIdInput::Text(text) => text.trim().parse().ok()?,
        };
        (id > 0).then_some(id)
    }
}

pub const UPLOAD_STATUS_HEADER: &str = "X-Contract-Upload";

#[utoipa::path(
    context_path = "/api",
    tag = "Reservations",
    post,
    path = "/reservas/generate-contract",
    request_body = GenerateContractRequest,
    responses(
        (status = 200, description = "Generated contract", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Missing reservation id or linked user/tour", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
        (status = 500, description = "Contract generation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_contract(
    req: HttpRequest,
    body: web::Json<GenerateContractRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WorkflowError> {
    let id = body.id().ok_or(WorkflowError::MissingReservationId)?;
    let origin = CallOrigin::from_request(&req);
    info!(
        "Generating contract for reservation {} ({:?}) requested by {:?}",
        id,
        origin,
        req.principal()
    );

    let delivery = state
        .workflow
        .generate_contract(id, origin)
        .await
        .inspect_err(|e| error!("Error generando contrato for reservation {}: {}", id, e))?;

    let upload_status = match delivery.upload {
        UploadOutcome::Uploaded { .. } => "uploaded",
        UploadOutcome::Failed { .. } => "failed",
    };
    Ok(HttpResponse::Ok()
        .content_type(PDF_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(delivery.document.filename)],
        })
        .insert_header((UPLOAD_STATUS_HEADER, upload_status))
        .body(delivery.document.pdf))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reservations",
    put,
    path = "/reservas/{id}/signed-contract",
    responses(
        (status = 200, description = "Reservation marked as signed", body = Reservation),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
        (status = 400, description = "Update failed", body = ErrorResponse)
    ),
    params(
        ("id" = i64, Path, description = "ID of the reservation")
    )
)]
pub async fn update_with_signed_contract(
    id: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = id.into_inner();
    match state.workflow.mark_signed(id).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(WorkflowError::NotFound(_)) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("Reserva no encontrada"))
        }
        Err(e) => {
            error!("Error al actualizar la reserva {} con contrato firmado: {}", id, e);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request("Error al actualizar la reserva"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/reservas/generate-contract")
            .wrap(from_fn(require_contract_token))
            .route(web::post().to(generate_contract)),
    )
    .service(
        web::resource("/reservas/{id}/signed-contract")
            .route(web::put().to(update_with_signed_contract)),
    );
}
