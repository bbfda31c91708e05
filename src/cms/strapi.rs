//! REST client for the Strapi CMS.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use super::normalize::unwrap_data;
use super::{
    Collection, EntityStore, FileUploader, Populate, StoreError, UploadError, UploadRequest,
    UploadSource, UploadedFile,
};

#[derive(Debug, Clone, Default)]
pub struct StrapiConfig {
    pub base_url: String,
    /// Token for entity reads and writes.
    pub api_token: Option<String>,
    /// Preferred token for uploads.
    pub user_token: Option<String>,
    /// Fallback token for uploads.
    pub admin_token: Option<String>,
}

impl StrapiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    fn upload_token(&self) -> Option<&str> {
        let present = |token: &&str| !token.is_empty();
        self.user_token
            .as_deref()
            .filter(present)
            .or_else(|| self.admin_token.as_deref().filter(present))
    }
}

#[derive(Debug, Clone)]
pub struct StrapiClient {
    config: StrapiConfig,
    http_client: Client,
}

impl StrapiClient {
    pub fn new(config: StrapiConfig, http_client: Client) -> Self {
        if config.upload_token().is_none() {
            warn!("No STRAPI_USER_TOKEN or STRAPI_ADMIN_TOKEN configured. File uploads may fail.");
        }
        Self {
            config,
            http_client,
        }
    }

    fn entity_url(&self, collection: Collection, id: i64) -> String {
        format!("{}/api/{}/{}", self.config.base_url, collection.endpoint, id)
    }

    fn with_api_token(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn entity_response(response: reqwest::Response) -> Result<Option<Value>, StoreError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        match unwrap_data(body) {
            Value::Null => Ok(None),
            entity => Ok(Some(entity)),
        }
    }
}

#[async_trait]
impl EntityStore for StrapiClient {
    async fn find_one(
        &self,
        collection: Collection,
        id: i64,
        populate: &Populate,
    ) -> Result<Option<Value>, StoreError> {
        let url = self.entity_url(collection, id);
        debug!("GET {} populate={:?}", url, populate.relations());

        let response = self
            .with_api_token(self.http_client.get(&url).query(&populate.to_query()))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::entity_response(response).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: i64,
        data: Value,
    ) -> Result<Option<Value>, StoreError> {
        let url = self.entity_url(collection, id);
        debug!("PUT {}", url);

        let response = self
            .with_api_token(self.http_client.put(&url).json(&json!({ "data": data })))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Self::entity_response(response).await
    }
}

#[async_trait]
impl FileUploader for StrapiClient {
    async fn upload(&self, request: UploadRequest) -> Result<Vec<UploadedFile>, UploadError> {
        let bytes = match request.source {
            UploadSource::Memory(bytes) => bytes,
            UploadSource::File(path) => tokio::fs::read(&path).await?,
        };
        let size = bytes.len();

        let file = Part::bytes(bytes)
            .file_name(request.filename.clone())
            .mime_str(&request.content_type)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("files", file)
            .text("ref", request.collection.uid)
            .text("refId", request.ref_id.to_string())
            .text("field", request.field.clone());

        let url = format!("{}/api/upload", self.config.base_url);
        debug!("Uploading {} ({} bytes) to {}", request.filename, size, url);

        let mut builder = self.http_client.post(&url).multipart(form);
        if let Some(token) = self.config.upload_token() {
            builder = builder.bearer_auth(token);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<UploadedFile>>()
            .await
            .map_err(|e| UploadError::Decode(e.to_string()))
    }
}
