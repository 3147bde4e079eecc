//! Persistence collaborators: blob storage for uploaded artifacts and the
//! key/value record store for submission records.
//!
//! Both are traits so the pipeline can be driven against in-memory doubles.
//! `Ok(None)` from a collaborator means "no result"; `Err` is a transport failure.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::models::document::Document;

pub mod redis_store;
pub mod s3_store;

/// Handle to a stored artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub path: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Uploads every document and returns the handle of the last one stored.
    async fn upload(&self, documents: &[Document]) -> Result<Option<StoredDocument>>;

    async fn read(&self, path: &str) -> Result<Option<Bytes>>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Values of every key starting with `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Keeps object keys to a safe character set.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}
