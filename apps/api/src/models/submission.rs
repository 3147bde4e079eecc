use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::document::Document;

/// What the caller hands in: job context plus the résumé itself.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub file: Option<Document>,
}

/// The persisted result of one pipeline run, stored as JSON in the record store.
///
/// `feedback` is `None` while analysis is pending. A record is never mutated:
/// attaching feedback produces a new value via [`SubmissionRecord::with_feedback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub resume_path: String,
    pub image_path: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub feedback: Option<Value>,
}

impl SubmissionRecord {
    /// Builds the feedback-pending record written before analysis.
    pub fn pending(
        id: Uuid,
        resume_path: String,
        image_path: String,
        request: &SubmissionRequest,
    ) -> Self {
        Self {
            id,
            resume_path,
            image_path,
            company_name: request.company_name.clone(),
            job_title: request.job_title.clone(),
            job_description: request.job_description.clone(),
            feedback: None,
        }
    }

    pub fn with_feedback(self, feedback: Value) -> Self {
        Self {
            feedback: Some(feedback),
            ..self
        }
    }
}

/// Record store key for a submission: `<prefix><id>`.
pub fn record_key(prefix: &str, id: Uuid) -> String {
    format!("{prefix}{id}")
}
