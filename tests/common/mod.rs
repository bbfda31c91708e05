#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use sitios_reservas_server::auth::{TokenVerifier, UserClaims};
use sitios_reservas_server::cms::{
    Collection, EntityStore, FileUploader, Populate, StoreError, UploadError, UploadRequest,
    UploadSource, UploadedFile,
};
use sitios_reservas_server::contract::PdfRenderEngine;
use sitios_reservas_server::mail::{MailError, Mailer, OutgoingEmail};
use sitios_reservas_server::reserva::{Collaborators, ContractStaging, ReservationWorkflow, WorkflowSettings};
use sitios_reservas_server::signing::{SignatureProvider, SigningError};
use sitios_reservas_server::AppState;

pub const SERVICE_TOKEN: &str = "service-token";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "ana@example.com";
pub const ENVELOPE_ID: &str = "env-123";

/// A CMS session token for `user_id`, signed with `secret`.
pub fn user_token(user_id: i64, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = UserClaims {
        id: user_id,
        iat: Some(now),
        exp: now + 600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token")
}

/// Entities kept in memory, keyed by id.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<i64, Value>>,
    updates: Mutex<Vec<(i64, Value)>>,
    reads: AtomicUsize,
    fail_updates: AtomicBool,
}

impl InMemoryStore {
    pub fn with(records: Vec<Value>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|record| record["id"].as_i64().map(|id| (id, record)))
            .collect();
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub async fn updates(&self) -> Vec<(i64, Value)> {
        self.updates.lock().await.clone()
    }

    pub async fn record(&self, id: i64) -> Option<Value> {
        self.records.lock().await.get(&id).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EntityStore for InMemoryStore {
    async fn find_one(
        &self,
        _collection: Collection,
        id: i64,
        _populate: &Populate,
    ) -> Result<Option<Value>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().await.get(&id).cloned())
    }

    async fn update(
        &self,
        _collection: Collection,
        id: i64,
        data: Value,
    ) -> Result<Option<Value>, StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 500,
                body: "update failed".to_string(),
            });
        }
        self.updates.lock().await.push((id, data.clone()));

        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let (Some(record), Some(patch)) = (record.as_object_mut(), data.as_object()) {
            for (key, value) in patch {
                record.insert(key.clone(), value.clone());
            }
        }
        Ok(Some(record.clone()))
    }
}

/// An upload as the uploader saw it. `bytes` is read at upload time, so a
/// staged file must still exist when the upload runs.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub filename: String,
    pub content_type: String,
    pub source: UploadSource,
    pub collection: Collection,
    pub ref_id: i64,
    pub field: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingUploader {
    uploads: Mutex<Vec<RecordedUpload>>,
    fail: AtomicBool,
}

impl RecordingUploader {
    pub fn failing() -> Self {
        let uploader = Self::default();
        uploader.fail.store(true, Ordering::SeqCst);
        uploader
    }

    pub async fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl FileUploader for RecordingUploader {
    async fn upload(&self, request: UploadRequest) -> Result<Vec<UploadedFile>, UploadError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(UploadError::Status {
                status: 403,
                body: "Forbidden".to_string(),
            });
        }
        let bytes = match &request.source {
            UploadSource::Memory(bytes) => bytes.clone(),
            UploadSource::File(path) => tokio::fs::read(path).await?,
        };

        let mut uploads = self.uploads.lock().await;
        uploads.push(RecordedUpload {
            filename: request.filename.clone(),
            content_type: request.content_type,
            source: request.source,
            collection: request.collection,
            ref_id: request.ref_id,
            field: request.field,
            bytes,
        });
        Ok(vec![UploadedFile {
            id: uploads.len() as i64,
            name: request.filename,
            url: format!("/uploads/contract_{}.pdf", uploads.len()),
        }])
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<String, MailError> {
        let mut sent = self.sent.lock().await;
        sent.push(email);
        Ok(format!("msg-{}", sent.len()))
    }
}

#[derive(Default)]
pub struct RecordingSigner {
    calls: Mutex<Vec<(String, usize)>>,
}

impl RecordingSigner {
    pub async fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SignatureProvider for RecordingSigner {
    async fn sign(&self, email: &str, document: &[u8]) -> Result<String, SigningError> {
        self.calls.lock().await.push((email.to_string(), document.len()));
        Ok(ENVELOPE_ID.to_string())
    }
}

pub fn user_record() -> Value {
    json!({
        "id": 3,
        "username": "ana",
        "email": USER_EMAIL,
        "firstName": "Ana",
        "lastName": "López",
        "Phone": "5512345678",
        "Nationality": "Mexicana"
    })
}

pub fn tour_record() -> Value {
    json!({
        "id": 9,
        "nombre": "Teotihuacan al amanecer",
        "descripcion": "Vuelo en globo",
        "precio": 2500.0,
        "ubicacion": "Teotihuacan"
    })
}

pub fn reservation_record(id: i64, confirmed: bool, signed: bool) -> Value {
    json!({
        "id": id,
        "Fecha": "2025-07-20",
        "Mensaje": "Llegamos temprano",
        "Confirmacion": confirmed,
        "documentoFirmado": signed,
        "users_permissions_user": user_record(),
        "tour_id": tour_record()
    })
}

/// Collaborators plus a private staging directory.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub uploader: Arc<RecordingUploader>,
    pub mailer: Arc<RecordingMailer>,
    pub signer: Arc<RecordingSigner>,
    pub staging_dir: tempfile::TempDir,
    pub cleanup_delay: Duration,
}

impl Harness {
    pub fn new(records: Vec<Value>) -> Self {
        Self::with_uploader(records, RecordingUploader::default())
    }

    pub fn with_uploader(records: Vec<Value>, uploader: RecordingUploader) -> Self {
        Self {
            store: Arc::new(InMemoryStore::with(records)),
            uploader: Arc::new(uploader),
            mailer: Arc::new(RecordingMailer::default()),
            signer: Arc::new(RecordingSigner::default()),
            staging_dir: tempfile::tempdir().expect("Failed to create staging dir"),
            cleanup_delay: Duration::from_millis(50),
        }
    }

    pub fn staging_path(&self) -> std::path::PathBuf {
        self.staging_dir.path().join("contracts")
    }

    pub fn workflow(&self, settings: WorkflowSettings) -> ReservationWorkflow {
        ReservationWorkflow::new(
            Collaborators {
                store: self.store.clone(),
                uploader: self.uploader.clone(),
                mailer: self.mailer.clone(),
                signer: self.signer.clone(),
                renderer: Arc::new(PdfRenderEngine::default()),
            },
            ContractStaging::new(self.staging_path(), self.cleanup_delay),
            settings,
        )
    }

    pub fn app_state(&self, settings: WorkflowSettings, webhook_token: Option<&str>) -> AppState {
        AppState::new(
            self.workflow(settings),
            TokenVerifier::new(Some(SERVICE_TOKEN.to_string()), Some(JWT_SECRET.to_string())),
            webhook_token.map(str::to_string),
        )
    }
}

pub fn settings() -> WorkflowSettings {
    WorkflowSettings {
        admin_email: Some(ADMIN_EMAIL.to_string()),
        ..WorkflowSettings::default()
    }
}
