//! CMS, mail and signature clients against a local fake server.

use std::sync::Mutex;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

use sitios_reservas_server::cms::{
    EntityStore, FileUploader, Populate, StoreError, UploadError, UploadRequest, UploadSource,
    RESERVAS,
};
use sitios_reservas_server::cms::{StrapiClient, StrapiConfig};
use sitios_reservas_server::mail::{MailError, Mailer, OutgoingEmail, ResendMailer};
use sitios_reservas_server::reserva::repository::contract_populate;
use sitios_reservas_server::reserva::Reservation;
use sitios_reservas_server::signing::{DocuSignClient, DocuSignConfig, SignatureProvider};

#[derive(Debug, Clone)]
struct Captured {
    method: String,
    path: String,
    query: String,
    authorization: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<Captured>>,
}

impl Recorder {
    fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

async fn fake_backend(req: HttpRequest, body: web::Bytes, recorder: web::Data<Recorder>) -> HttpResponse {
    recorder.requests.lock().unwrap().push(Captured {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        authorization: req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    match (req.method().as_str(), req.path()) {
        ("GET", "/api/reservas/1") => HttpResponse::Ok().json(json!({
            "data": {
                "id": 1,
                "attributes": {
                    "Confirmacion": true,
                    "users_permissions_user": {"data": {"id": 3, "attributes": {"email": "ana@example.com"}}},
                    "tour_id": {"data": {"id": 9, "attributes": {"nombre": "Teotihuacan"}}}
                }
            },
            "meta": {}
        })),
        ("GET", "/api/reservas/2") => HttpResponse::Ok().json(json!({"data": null})),
        ("GET", "/api/reservas/500") => HttpResponse::InternalServerError().body("boom"),
        ("PUT", "/api/reservas/1") => {
            let sent: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let mut record = sent["data"].clone();
            record["id"] = json!(1);
            HttpResponse::Ok().json(json!({"data": record}))
        }
        ("POST", "/api/upload") => HttpResponse::Ok().json(json!([
            {"id": 10, "name": "contrato-1.pdf", "url": "/uploads/contrato_1.pdf"}
        ])),
        ("POST", "/emails") => HttpResponse::Ok().json(json!({"id": "email-1"})),
        ("POST", "/restapi/v2.1/accounts/acc-1/envelopes") => {
            HttpResponse::Created().json(json!({"envelopeId": "env-9", "status": "sent"}))
        }
        _ => HttpResponse::NotFound().json(json!({"data": null, "error": {"status": 404}})),
    }
}

async fn start_backend() -> (String, web::Data<Recorder>) {
    let recorder = web::Data::new(Recorder::default());
    let data = recorder.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(fake_backend))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("bind fake backend");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{}", addr), recorder)
}

fn strapi(base_url: &str) -> StrapiClient {
    let config = StrapiConfig {
        api_token: Some("api-token".to_string()),
        admin_token: Some("admin-token".to_string()),
        ..StrapiConfig::new(base_url)
    };
    StrapiClient::new(config, reqwest::Client::new())
}

#[actix_web::test]
async fn test_find_one_normalizes_envelope() {
    let (base_url, recorder) = start_backend().await;
    let client = strapi(&base_url);

    let value = client
        .find_one(RESERVAS, 1, &contract_populate())
        .await
        .expect("request should succeed")
        .expect("reservation exists");
    let reservation: Reservation = serde_json::from_value(value).expect("flat record");
    assert_eq!(reservation.id, 1);
    assert!(reservation.is_confirmed());
    assert_eq!(
        reservation.user.and_then(|user| user.email).as_deref(),
        Some("ana@example.com")
    );
    assert_eq!(reservation.tour.and_then(|tour| tour.nombre).as_deref(), Some("Teotihuacan"));

    let requests = recorder.requests();
    let request = &requests[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer api-token"));
    assert!(request.query.contains("populate"), "{}", request.query);
}

#[actix_web::test]
async fn test_find_one_missing_and_failing() {
    let (base_url, _recorder) = start_backend().await;
    let client = strapi(&base_url);

    assert!(client.find_one(RESERVAS, 2, &Populate::new()).await.unwrap().is_none());
    assert!(client.find_one(RESERVAS, 404, &Populate::new()).await.unwrap().is_none());
    assert!(matches!(
        client.find_one(RESERVAS, 500, &Populate::new()).await,
        Err(StoreError::Status { status: 500, .. })
    ));
}

#[actix_web::test]
async fn test_update_wraps_data() {
    let (base_url, recorder) = start_backend().await;
    let client = strapi(&base_url);

    let updated = client
        .update(RESERVAS, 1, json!({"documentoFirmado": true}))
        .await
        .expect("request should succeed")
        .expect("reservation exists");
    assert_eq!(updated, json!({"id": 1, "documentoFirmado": true}));

    let requests = recorder.requests();
    let request = &requests[0];
    assert_eq!(request.method, "PUT");
    let sent: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, json!({"data": {"documentoFirmado": true}}));
}

#[actix_web::test]
async fn test_upload_sends_reference_fields() {
    let (base_url, recorder) = start_backend().await;
    let client = strapi(&base_url);

    let files = client
        .upload(UploadRequest {
            filename: "contrato-1.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            source: UploadSource::Memory(b"%PDF-1.7 test".to_vec()),
            collection: RESERVAS,
            ref_id: 1,
            field: "contrato_generado".to_string(),
        })
        .await
        .expect("upload should succeed");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, 10);

    let requests = recorder.requests();
    let request = &requests[0];
    assert_eq!(request.path, "/api/upload");
    assert_eq!(request.authorization.as_deref(), Some("Bearer admin-token"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"files\"; filename=\"contrato-1.pdf\""), "{}", body);
    assert!(body.contains("api::reserva.reserva"));
    assert!(body.contains("name=\"refId\""));
    assert!(body.contains("contrato_generado"));
    assert!(body.contains("%PDF-1.7 test"));
}

#[actix_web::test]
async fn test_upload_of_missing_staged_file_fails_before_request() {
    let (base_url, recorder) = start_backend().await;
    let client = strapi(&base_url);
    let dir = tempfile::tempdir().unwrap();

    let result = client
        .upload(UploadRequest {
            filename: "contrato-1.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            source: UploadSource::File(dir.path().join("gone.pdf")),
            collection: RESERVAS,
            ref_id: 1,
            field: "contrato_generado".to_string(),
        })
        .await;
    assert!(matches!(result, Err(UploadError::Source(_))));
    assert!(recorder.requests().is_empty());
}

#[actix_web::test]
async fn test_resend_mailer_posts_email() {
    let (base_url, recorder) = start_backend().await;
    let mailer = ResendMailer::new(reqwest::Client::new(), "re_key").with_base_url(&base_url);

    let id = mailer
        .send(OutgoingEmail {
            from: "Sitios <admin@example.com>".to_string(),
            to: vec!["ana@example.com".to_string()],
            cc: Vec::new(),
            subject: "Hola".to_string(),
            text: "Texto".to_string(),
            attachments: Vec::new(),
        })
        .await
        .expect("mail should be accepted");
    assert_eq!(id, "email-1");

    let requests = recorder.requests();
    let request = &requests[0];
    assert_eq!(request.path, "/emails");
    assert_eq!(request.authorization.as_deref(), Some("Bearer re_key"));
    let sent: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent["subject"], "Hola");
    assert!(sent.get("cc").is_none());

    let blank = mailer
        .send(OutgoingEmail {
            from: "a@example.com".to_string(),
            to: vec![" ".to_string()],
            cc: Vec::new(),
            subject: "x".to_string(),
            text: "x".to_string(),
            attachments: Vec::new(),
        })
        .await;
    assert!(matches!(blank, Err(MailError::NoRecipient)));
    assert_eq!(recorder.requests().len(), 1);
}

#[actix_web::test]
async fn test_docusign_creates_envelope() {
    let (base_url, recorder) = start_backend().await;
    let client = DocuSignClient::new(
        DocuSignConfig {
            base_path: format!("{}/restapi", base_url),
            access_token: "ds-token".to_string(),
            account_id: "acc-1".to_string(),
        },
        reqwest::Client::new(),
    );

    let envelope = client
        .sign("ana@example.com", b"%PDF")
        .await
        .expect("envelope should be created");
    assert_eq!(envelope, "env-9");

    let requests = recorder.requests();
    let request = &requests[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer ds-token"));
    let sent: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent["status"], "sent");
    assert_eq!(sent["recipients"]["signers"][0]["email"], "ana@example.com");
    assert_eq!(sent["documents"][0]["documentBase64"], "JVBERg==");
}
