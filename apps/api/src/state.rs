use std::sync::Arc;

use crate::storage::{DocumentStore, RecordStore};
use crate::submission::pipeline::SubmissionPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SubmissionPipeline,
    /// Read side for stored artifacts; the pipeline holds its own handle for writes.
    pub documents: Arc<dyn DocumentStore>,
    pub records: Arc<dyn RecordStore>,
}
