//! Client side of the content-management backend.
//!
//! The workflow only needs two capabilities from the CMS: reading and
//! updating entities, and attaching uploaded files to an entity field. Each
//! is a trait so tests can run against in-memory doubles.

pub mod lenient;
pub mod normalize;
pub mod strapi;

pub use strapi::{StrapiClient, StrapiConfig};

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A collection type: the model uid used for upload references and the REST
/// path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub uid: &'static str,
    pub endpoint: &'static str,
}

pub const RESERVAS: Collection = Collection {
    uid: "api::reserva.reserva",
    endpoint: "reservas",
};

/// Which relations to resolve on a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Populate {
    relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    /// Empty means every field.
    pub fields: Vec<&'static str>,
}

impl Populate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relation(mut self, name: &'static str, fields: &[&'static str]) -> Self {
        self.relations.push(Relation {
            name,
            fields: fields.to_vec(),
        });
        self
    }

    pub fn all(self, name: &'static str) -> Self {
        self.relation(name, &[])
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Query pairs in the CMS's bracket notation.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        for relation in &self.relations {
            if relation.fields.is_empty() {
                query.push((format!("populate[{}]", relation.name), "true".to_string()));
                continue;
            }
            for (index, field) in relation.fields.iter().enumerate() {
                query.push((
                    format!("populate[{}][fields][{}]", relation.name, index),
                    field.to_string(),
                ));
            }
        }
        query
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage request failed: {0}")]
    Transport(String),
    #[error("storage responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected storage payload: {0}")]
    Decode(String),
}

/// Entity reads and writes. `None` means the entity does not exist.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_one(
        &self,
        collection: Collection,
        id: i64,
        populate: &Populate,
    ) -> Result<Option<Value>, StoreError>;

    async fn update(
        &self,
        collection: Collection,
        id: i64,
        data: Value,
    ) -> Result<Option<Value>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Memory(Vec<u8>),
    /// A staged file, read when the request is built.
    File(PathBuf),
}

/// A file attached to `field` of entity `ref_id` in `collection`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub source: UploadSource,
    pub collection: Collection,
    pub ref_id: i64,
    pub field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read staged file: {0}")]
    Source(#[from] std::io::Error),
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected upload response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<Vec<UploadedFile>, UploadError>;
}
