use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::document::Document;
use crate::storage::{sanitize_file_name, DocumentStore, StoredDocument};

/// Document store backed by an S3 bucket (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3DocumentStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3DocumentStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

/// `uploads/<uuid>/<file name>`. A fresh prefix per object so names never collide.
fn object_key(document: &Document) -> String {
    format!(
        "uploads/{}/{}",
        Uuid::new_v4(),
        sanitize_file_name(&document.file_name)
    )
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn upload(&self, documents: &[Document]) -> Result<Option<StoredDocument>> {
        let mut last = None;

        for document in documents {
            if document.is_empty() {
                debug!("Skipping empty document {:?}", document.file_name);
                continue;
            }

            let key = object_key(document);
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .body(ByteStream::from(document.bytes.clone()))
                .content_type(&document.content_type)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

            info!("Uploaded {} bytes to s3://{}/{}", document.bytes.len(), self.bucket, key);
            last = Some(StoredDocument { path: key });
        }

        Ok(last)
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("S3 download failed: {err}"));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read s3://{}/{}", self.bucket, path))?;

        Ok(Some(data.into_bytes()))
    }
}
