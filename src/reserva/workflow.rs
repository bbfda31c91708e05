//! Reservation workflow.
//!
//! Every reaction is a linear sequence of awaited collaborator calls:
//! fetch, render, upload, mail. Integration failures after the fetch are
//! logged and reported in the returned outcome; they never fail the
//! mutation that triggered the reaction.

use std::sync::Arc;

use actix_web::http::header::HOST;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::model::{LifecycleEntry, Reservation, ReservationPatch};
use super::repository::{contract_populate, full_populate, ReservationRepository};
use super::staging::ContractStaging;
use crate::cms::{EntityStore, FileUploader, Populate, StoreError, UploadRequest, UploadSource, RESERVAS};
use crate::contract::common::today;
use crate::contract::itinerary::itinerary_document;
use crate::contract::template::full_name;
use crate::contract::{
    contract_document, ContractFields, ContractSettings, Document, DocumentRenderer,
    GeneratedDocument, GeneratorError,
};
use crate::mail::{templates, Mailer, OutgoingEmail, DEFAULT_SENDER};
use crate::signing::SignatureProvider;
use crate::ErrorResponse;

pub const CONTRACT_FIELD: &str = "contrato_generado";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DEFAULT_DOCUMENT_BASE_URL: &str = "https://example.com/documents";

/// Whether a request came from outside the process (HTTP) or from a
/// lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrigin {
    Internal,
    External,
}

impl CallOrigin {
    /// Requests naming a host, in the `Host` header (HTTP/1.1) or the URI
    /// authority (HTTP/2), are external. Anything else is internal.
    pub fn from_request(req: &HttpRequest) -> Self {
        let has_host = req.headers().get(HOST).is_some_and(|host| !host.is_empty());
        if has_host || req.uri().authority().is_some() {
            CallOrigin::External
        } else {
            CallOrigin::Internal
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Reservation ID is required")]
    MissingReservationId,
    #[error("Reservation {0} not found")]
    NotFound(i64),
    #[error("User or Tour data is missing")]
    MissingRelations { has_user: bool, has_tour: bool },
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("contract generation failed: {0}")]
    Generation(#[from] GeneratorError),
    #[error("failed to update reservation: {0}")]
    UpdateFailed(#[source] StoreError),
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::MissingReservationId
            | WorkflowError::MissingRelations { .. }
            | WorkflowError::UpdateFailed(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Store(_) | WorkflowError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            WorkflowError::MissingReservationId => ErrorResponse::bad_request("Reservation ID is required"),
            WorkflowError::MissingRelations { .. } => {
                ErrorResponse::bad_request("User or Tour data is missing")
            }
            WorkflowError::UpdateFailed(_) => ErrorResponse::bad_request("Error al actualizar la reserva"),
            WorkflowError::NotFound(_) => ErrorResponse::not_found("Reservation not found"),
            WorkflowError::Store(_) | WorkflowError::Generation(_) => {
                ErrorResponse::internal_error("Error al generar el contrato")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { file_ids: Vec<i64> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MailOutcome {
    Sent { message_id: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub template: &'static str,
    #[serde(flatten)]
    pub outcome: MailOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContractStep {
    Generated {
        filename: String,
        bytes: usize,
        upload: UploadOutcome,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOutcome {
    pub contract: ContractStep,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The update was the generated contract being attached.
    ContractAttachment,
    MissingId,
    ReservationMissing,
    FetchFailed { reason: String },
    NoUser,
    NoEmail,
    /// Neither confirmation branch applies.
    NotConfirmed,
    /// Confirmed with e-signature disabled.
    AwaitingSignature {
        document_url: String,
        confirmation: Option<MailOutcome>,
    },
    SentForSigning {
        document_url: String,
        envelope_id: String,
    },
    SigningFailed {
        document_url: String,
        envelope_id: Option<String>,
        reason: String,
    },
    ItinerarySent { message_id: String },
    ItineraryFailed { reason: String },
}

/// A rendered contract and what happened to its upload.
#[derive(Debug, Clone)]
pub struct ContractDelivery {
    pub document: GeneratedDocument,
    pub upload: UploadOutcome,
}

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub contract: ContractSettings,
    pub mail_from: String,
    pub admin_email: Option<String>,
    pub enable_esign: bool,
    pub document_base_url: String,
    /// Send the confirmation email when a reservation is confirmed and
    /// e-signature is disabled.
    pub send_confirmation_email: bool,
    /// Send the admin notice and client receipt on creation.
    pub notify_on_create: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            contract: ContractSettings::default(),
            mail_from: DEFAULT_SENDER.to_string(),
            admin_email: None,
            enable_esign: false,
            document_base_url: DEFAULT_DOCUMENT_BASE_URL.to_string(),
            send_confirmation_email: false,
            notify_on_create: false,
        }
    }
}

pub struct Collaborators {
    pub store: Arc<dyn EntityStore>,
    pub uploader: Arc<dyn FileUploader>,
    pub mailer: Arc<dyn Mailer>,
    pub signer: Arc<dyn SignatureProvider>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

pub struct ReservationWorkflow {
    repository: ReservationRepository,
    uploader: Arc<dyn FileUploader>,
    mailer: Arc<dyn Mailer>,
    signer: Arc<dyn SignatureProvider>,
    renderer: Arc<dyn DocumentRenderer>,
    staging: ContractStaging,
    settings: WorkflowSettings,
}

impl ReservationWorkflow {
    pub fn new(collaborators: Collaborators, staging: ContractStaging, settings: WorkflowSettings) -> Self {
        Self {
            repository: ReservationRepository::new(collaborators.store),
            uploader: collaborators.uploader,
            mailer: collaborators.mailer,
            signer: collaborators.signer,
            renderer: collaborators.renderer,
            staging,
            settings,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn document_url(&self, reservation_id: i64) -> String {
        format!(
            "{}/reserva-{}.pdf",
            self.settings.document_base_url.trim_end_matches('/'),
            reservation_id
        )
    }

    async fn render(&self, document: Document) -> Result<Vec<u8>, GeneratorError> {
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| GeneratorError::Task(e.to_string()))?
    }

    /// Render the contract for an already fetched reservation.
    pub async fn contract_for(&self, reservation: &Reservation) -> Result<GeneratedDocument, WorkflowError> {
        let (user, tour) = match (&reservation.user, &reservation.tour) {
            (Some(user), Some(tour)) => (user, tour),
            (user, tour) => {
                return Err(WorkflowError::MissingRelations {
                    has_user: user.is_some(),
                    has_tour: tour.is_some(),
                })
            }
        };

        let fields = ContractFields::from_records(user, tour, today());
        let document = contract_document(&fields, &self.settings.contract);
        let pdf = self.render(document).await?;

        Ok(GeneratedDocument {
            filename: format!(
                "contrato-{}-{}.pdf",
                reservation.id,
                chrono::Utc::now().timestamp_millis()
            ),
            pdf,
        })
    }

    /// Fetch reservation `id` with the contract relations and render it.
    pub async fn render_contract(&self, id: i64) -> Result<(Reservation, GeneratedDocument), WorkflowError> {
        let reservation = self
            .repository
            .find(id, &contract_populate())
            .await?
            .ok_or(WorkflowError::NotFound(id))?;
        let document = self.contract_for(&reservation).await?;
        debug!(
            "Rendered {} ({} bytes) for reservation {}",
            document.filename,
            document.pdf.len(),
            id
        );
        Ok((reservation, document))
    }

    /// Upload `document` to the reservation's contract field. External
    /// calls go through a staged temp file, internal ones upload from
    /// memory.
    pub async fn attach_contract(
        &self,
        reservation_id: i64,
        document: &GeneratedDocument,
        origin: CallOrigin,
    ) -> UploadOutcome {
        let staged = match origin {
            CallOrigin::Internal => None,
            CallOrigin::External => match self.staging.stage(reservation_id, &document.pdf) {
                Ok(staged) => Some(staged),
                Err(e) => {
                    warn!(
                        "Could not stage contract for reservation {}, uploading from memory: {}",
                        reservation_id, e
                    );
                    None
                }
            },
        };

        let (filename, source) = match &staged {
            Some(staged) => (staged.file_name(), UploadSource::File(staged.path().to_path_buf())),
            None => (document.filename.clone(), UploadSource::Memory(document.pdf.clone())),
        };
        let request = UploadRequest {
            filename,
            content_type: PDF_CONTENT_TYPE.to_string(),
            source,
            collection: RESERVAS,
            ref_id: reservation_id,
            field: CONTRACT_FIELD.to_string(),
        };

        let result = self.uploader.upload(request).await;
        if let Some(staged) = staged {
            let _ = self.staging.schedule_removal(staged);
        }

        match result {
            Ok(files) => {
                info!("Uploaded contract for reservation {}", reservation_id);
                UploadOutcome::Uploaded {
                    file_ids: files.into_iter().map(|file| file.id).collect(),
                }
            }
            Err(e) => {
                error!("Error uploading file for reservation {}: {}", reservation_id, e);
                UploadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Render the contract and attach it. The rendered bytes are returned
    /// whatever happens to the upload.
    pub async fn generate_contract(&self, id: i64, origin: CallOrigin) -> Result<ContractDelivery, WorkflowError> {
        let (_, document) = self.render_contract(id).await?;
        let upload = self.attach_contract(id, &document, origin).await;
        Ok(ContractDelivery { document, upload })
    }

    async fn deliver(&self, email: OutgoingEmail) -> MailOutcome {
        let subject = email.subject.clone();
        match self.mailer.send(email).await {
            Ok(message_id) => {
                info!("Sent '{}' ({})", subject, message_id);
                MailOutcome::Sent { message_id }
            }
            Err(e) => {
                error!("Error sending '{}': {}", subject, e);
                MailOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Reaction to a newly created reservation.
    pub async fn on_created(&self, entry: &LifecycleEntry) -> CreateOutcome {
        let Some(id) = entry.id else {
            warn!("Created reservation event without id");
            return CreateOutcome {
                contract: ContractStep::Failed {
                    reason: WorkflowError::MissingReservationId.to_string(),
                },
                notifications: Vec::new(),
            };
        };

        let contract = match self.generate_contract(id, CallOrigin::Internal).await {
            Ok(delivery) => ContractStep::Generated {
                filename: delivery.document.filename,
                bytes: delivery.document.pdf.len(),
                upload: delivery.upload,
            },
            Err(e) => {
                error!("Contract generation failed for reservation {}: {}", id, e);
                ContractStep::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let notifications = if self.settings.notify_on_create {
            self.creation_notices(id).await
        } else {
            Vec::new()
        };

        CreateOutcome {
            contract,
            notifications,
        }
    }

    async fn creation_notices(&self, id: i64) -> Vec<Notification> {
        let reservation = match self.repository.find(id, &full_populate()).await {
            Ok(Some(reservation)) => reservation,
            Ok(None) => Reservation {
                id,
                ..Reservation::default()
            },
            Err(e) => {
                error!("Could not load reservation {} for notifications: {}", id, e);
                Reservation {
                    id,
                    ..Reservation::default()
                }
            }
        };
        let from = &self.settings.mail_from;
        let mut notifications = Vec::with_capacity(2);

        let admin = match self.settings.admin_email.as_deref() {
            Some(admin) => self.deliver(templates::admin_notification(from, &reservation, admin)).await,
            None => {
                error!("ADMIN_EMAIL environment variable not set.");
                MailOutcome::Failed {
                    reason: "ADMIN_EMAIL environment variable not set.".to_string(),
                }
            }
        };
        notifications.push(Notification {
            template: "admin_notification",
            outcome: admin,
        });

        let recipient = reservation
            .email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .or_else(|| reservation.user.as_ref().and_then(|user| user.email.clone()));
        let name = reservation
            .nombre_completo
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| reservation.user.as_ref().map(full_name))
            .unwrap_or_default();
        let receipt = match recipient {
            Some(to) => {
                self.deliver(templates::client_receipt(from, &reservation, &to, &name))
                    .await
            }
            None => MailOutcome::Failed {
                reason: "reservation has no contact email".to_string(),
            },
        };
        notifications.push(Notification {
            template: "client_receipt",
            outcome: receipt,
        });

        notifications
    }

    /// Reaction to an updated reservation.
    pub async fn on_updated(&self, entry: &LifecycleEntry) -> UpdateOutcome {
        if entry.has_generated_contract() {
            info!("Contract file detected in reservation, skipping email notifications");
            return UpdateOutcome::ContractAttachment;
        }
        let Some(id) = entry.id else {
            warn!("Invalid reservation data in update event");
            return UpdateOutcome::MissingId;
        };

        let reservation = match self.repository.find(id, &full_populate()).await {
            Ok(Some(reservation)) => reservation,
            Ok(None) => {
                warn!("Reservation {} disappeared before the update reaction", id);
                return UpdateOutcome::ReservationMissing;
            }
            Err(e) => {
                error!("Error in update reaction for reservation {}: {}", id, e);
                return UpdateOutcome::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(user) = reservation.user.as_ref() else {
            info!("No user associated with reservation {}", id);
            return UpdateOutcome::NoUser;
        };
        let Some(email) = user.email.clone().filter(|email| !email.trim().is_empty()) else {
            info!("User of reservation {} has no email", id);
            return UpdateOutcome::NoEmail;
        };

        match (reservation.is_confirmed(), reservation.is_signed()) {
            (true, false) => self.request_signature(&reservation, &email).await,
            (true, true) => self.send_itinerary(&reservation, &email).await,
            _ => UpdateOutcome::NotConfirmed,
        }
    }

    async fn request_signature(&self, reservation: &Reservation, email: &str) -> UpdateOutcome {
        let document_url = self.document_url(reservation.id);

        if !self.settings.enable_esign {
            let confirmation = if self.settings.send_confirmation_email {
                let message = templates::confirmation(
                    &self.settings.mail_from,
                    reservation,
                    email,
                    self.settings.admin_email.as_deref(),
                );
                Some(self.deliver(message).await)
            } else {
                None
            };
            return UpdateOutcome::AwaitingSignature {
                document_url,
                confirmation,
            };
        }

        let document = match self.contract_for(reservation).await {
            Ok(document) => document,
            Err(e) => {
                error!("Error in confirmation process for reservation {}: {}", reservation.id, e);
                return UpdateOutcome::SigningFailed {
                    document_url,
                    envelope_id: None,
                    reason: e.to_string(),
                };
            }
        };

        let envelope_id = match self.signer.sign(email, &document.pdf).await {
            Ok(envelope_id) => envelope_id,
            Err(e) => {
                error!("Signature request failed for reservation {}: {}", reservation.id, e);
                return UpdateOutcome::SigningFailed {
                    document_url,
                    envelope_id: None,
                    reason: e.to_string(),
                };
            }
        };

        match self
            .repository
            .update(reservation.id, &ReservationPatch::envelope(envelope_id.clone()))
            .await
        {
            Ok(Some(_)) => UpdateOutcome::SentForSigning {
                document_url,
                envelope_id,
            },
            Ok(None) => UpdateOutcome::SigningFailed {
                document_url,
                envelope_id: Some(envelope_id),
                reason: WorkflowError::NotFound(reservation.id).to_string(),
            },
            Err(e) => {
                error!("Could not store envelope for reservation {}: {}", reservation.id, e);
                UpdateOutcome::SigningFailed {
                    document_url,
                    envelope_id: Some(envelope_id),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn send_itinerary(&self, reservation: &Reservation, email: &str) -> UpdateOutcome {
        let Some(admin) = self.settings.admin_email.clone() else {
            error!("ADMIN_EMAIL environment variable not set.");
            return UpdateOutcome::ItineraryFailed {
                reason: "ADMIN_EMAIL environment variable not set.".to_string(),
            };
        };
        let Some(user) = reservation.user.as_ref() else {
            return UpdateOutcome::NoUser;
        };

        let pdf = match self.render(itinerary_document(reservation, user)).await {
            Ok(pdf) => pdf,
            Err(e) => {
                error!("Error generating itinerary for reservation {}: {}", reservation.id, e);
                return UpdateOutcome::ItineraryFailed {
                    reason: e.to_string(),
                };
            }
        };

        let message = templates::itinerary(&self.settings.mail_from, reservation.id, email, &admin, pdf);
        match self.deliver(message).await {
            MailOutcome::Sent { message_id } => {
                info!("Itinerary sent to {}", email);
                UpdateOutcome::ItinerarySent { message_id }
            }
            MailOutcome::Failed { reason } => UpdateOutcome::ItineraryFailed { reason },
        }
    }

    /// Flag reservation `id` as signed and return the updated record.
    pub async fn mark_signed(&self, id: i64) -> Result<Value, WorkflowError> {
        let exists = self
            .repository
            .find(id, &Populate::new())
            .await
            .map_err(WorkflowError::UpdateFailed)?
            .is_some();
        if !exists {
            return Err(WorkflowError::NotFound(id));
        }

        match self.repository.update(id, &ReservationPatch::signed()).await {
            Ok(Some(updated)) => {
                info!("Reservation {} marked as signed", id);
                Ok(updated)
            }
            Ok(None) => Err(WorkflowError::NotFound(id)),
            Err(e) => {
                error!("Error al actualizar la reserva {} con contrato firmado: {}", id, e);
                Err(WorkflowError::UpdateFailed(e))
            }
        }
    }
}
