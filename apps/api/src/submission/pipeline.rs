//! Submission pipeline: drives one résumé from upload to stored feedback.
//!
//! Flow: upload document → render first page → upload image → write pending
//!       record → request feedback → parse → rewrite record with feedback.
//!
//! Every collaborator call is awaited before the next begins. The first failing
//! step ends the run; nothing already uploaded or written is rolled back, so a
//! failure after the pending write leaves a feedback-less record in the store.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::inference::response::extract_feedback;
use crate::inference::InferenceClient;
use crate::llm_client::prompts::EVIDENCE_INSTRUCTION;
use crate::models::document::Document;
use crate::models::submission::{record_key, SubmissionRecord, SubmissionRequest};
use crate::render::DocumentRenderer;
use crate::storage::{DocumentStore, RecordStore};
use crate::submission::prompts::{FEEDBACK_FORMAT, FEEDBACK_PROMPT_TEMPLATE};
use crate::submission::status::{
    drain, status_channel, FailureStage, PipelineStage, PipelineStatus, StatusSender,
};

pub const DEFAULT_KEY_PREFIX: &str = "resume:";

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Complete(SubmissionRecord),
    Failed { stage: FailureStage, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Failure {
    stage: FailureStage,
    reason: String,
}

impl Failure {
    fn new(stage: FailureStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Run state. Each variant carries exactly what the next transition needs.
enum Stage {
    UploadingDocument {
        document: Document,
    },
    ConvertingToImage {
        document: Document,
        resume_path: String,
    },
    UploadingImage {
        image: Document,
        resume_path: String,
    },
    PreparingRecord {
        resume_path: String,
        image_path: String,
    },
    Analyzing {
        record: SubmissionRecord,
        key: String,
    },
    Complete(SubmissionRecord),
    Failed(Failure),
}

impl Stage {
    fn status(&self) -> PipelineStatus {
        let stage = match self {
            Stage::UploadingDocument { .. } => PipelineStage::UploadingDocument,
            Stage::ConvertingToImage { .. } => PipelineStage::ConvertingToImage,
            Stage::UploadingImage { .. } => PipelineStage::UploadingImage,
            Stage::PreparingRecord { .. } => PipelineStage::PreparingRecord,
            Stage::Analyzing { .. } => PipelineStage::Analyzing,
            Stage::Complete(_) => PipelineStage::Complete,
            Stage::Failed(failure) => return PipelineStatus::failed(failure.stage),
        };
        PipelineStatus::entered(stage)
    }
}

/// Collapses a collaborator's `Result<Option<T>>` into the value or a stage-tagged failure.
fn settle<T>(
    result: anyhow::Result<Option<T>>,
    stage: FailureStage,
    missing: &str,
) -> Result<T, Failure> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(Failure::new(stage, missing)),
        Err(e) => Err(Failure::new(stage, format!("{missing}: {e:#}"))),
    }
}

/// Fills the feedback prompt with the job context. Placeholders are resolved
/// in a single pass over the template, so braces in user text stay literal.
pub fn build_instructions(job_title: &str, job_description: &str) -> String {
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("{job_title}", job_title.trim()),
            ("{job_description}", job_description.trim()),
            ("{evidence_instruction}", EVIDENCE_INSTRUCTION),
            ("{feedback_format}", FEEDBACK_FORMAT),
        ],
    )
}

/// Substitutes `values` into `template`. Inserted text is never rescanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Orchestrates the four collaborators. Holds no per-run state, so one
/// instance can serve concurrent runs.
#[derive(Clone)]
pub struct SubmissionPipeline {
    documents: Arc<dyn DocumentStore>,
    renderer: Arc<dyn DocumentRenderer>,
    records: Arc<dyn RecordStore>,
    inference: Arc<dyn InferenceClient>,
    key_prefix: String,
}

impl SubmissionPipeline {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        renderer: Arc<dyn DocumentRenderer>,
        records: Arc<dyn RecordStore>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        Self {
            documents,
            renderer,
            records,
            inference,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Runs the pipeline and returns the outcome together with every status
    /// reported along the way.
    pub async fn run_collecting(
        &self,
        request: SubmissionRequest,
    ) -> (PipelineOutcome, Vec<PipelineStatus>) {
        let (tx, mut rx) = status_channel();
        let outcome = self.run(request, &tx).await;
        drop(tx);
        (outcome, drain(&mut rx))
    }

    /// Runs the pipeline to completion or to the first failure. A status is
    /// sent on `status` each time a stage is entered, terminal ones included.
    /// The caller is expected to have validated `request` already.
    pub async fn run(&self, request: SubmissionRequest, status: &StatusSender) -> PipelineOutcome {
        let mut stage = match request.file.clone() {
            Some(document) => Stage::UploadingDocument { document },
            None => Stage::Failed(Failure::new(
                FailureStage::UploadResume,
                "no document attached",
            )),
        };

        loop {
            let entered = stage.status();
            if let Stage::Failed(failure) = &stage {
                warn!("Submission failed at {}: {}", failure.stage, failure.reason);
            } else {
                info!("{}", entered.message);
            }
            // The receiver may have gone away; progress reporting is best-effort.
            let _ = status.send(entered);

            stage = match stage {
                Stage::UploadingDocument { document } => self.upload_document(document).await,
                Stage::ConvertingToImage {
                    document,
                    resume_path,
                } => self.convert_to_image(document, resume_path).await,
                Stage::UploadingImage { image, resume_path } => {
                    self.upload_image(image, resume_path).await
                }
                Stage::PreparingRecord {
                    resume_path,
                    image_path,
                } => self.prepare_record(&request, resume_path, image_path).await,
                Stage::Analyzing { record, key } => self.analyze(record, key).await,
                Stage::Complete(record) => {
                    info!("Submission {} complete", record.id);
                    return PipelineOutcome::Complete(record);
                }
                Stage::Failed(Failure { stage, reason }) => {
                    return PipelineOutcome::Failed { stage, reason };
                }
            }
            .unwrap_or_else(Stage::Failed);
        }
    }

    async fn upload_document(&self, document: Document) -> Result<Stage, Failure> {
        let stored = settle(
            self.documents.upload(std::slice::from_ref(&document)).await,
            FailureStage::UploadResume,
            "document store returned no path for the resume",
        )?;
        Ok(Stage::ConvertingToImage {
            document,
            resume_path: stored.path,
        })
    }

    async fn convert_to_image(
        &self,
        document: Document,
        resume_path: String,
    ) -> Result<Stage, Failure> {
        let image = settle(
            self.renderer.render(&document).await,
            FailureStage::Convert,
            "renderer produced no image",
        )?;
        Ok(Stage::UploadingImage { image, resume_path })
    }

    async fn upload_image(&self, image: Document, resume_path: String) -> Result<Stage, Failure> {
        let stored = settle(
            self.documents.upload(std::slice::from_ref(&image)).await,
            FailureStage::UploadImage,
            "document store returned no path for the image",
        )?;
        Ok(Stage::PreparingRecord {
            resume_path,
            image_path: stored.path,
        })
    }

    /// Writes the feedback-pending record. Must land before inference starts.
    async fn prepare_record(
        &self,
        request: &SubmissionRequest,
        resume_path: String,
        image_path: String,
    ) -> Result<Stage, Failure> {
        let id = Uuid::new_v4();
        let key = record_key(&self.key_prefix, id);
        let record = SubmissionRecord::pending(id, resume_path, image_path, request);

        self.write_record(&key, &record, FailureStage::Prepare).await?;
        info!("Stored pending record under {key}");

        Ok(Stage::Analyzing { record, key })
    }

    async fn analyze(&self, record: SubmissionRecord, key: String) -> Result<Stage, Failure> {
        let instructions = build_instructions(&record.job_title, &record.job_description);
        let response = settle(
            self.inference.feedback(&record.resume_path, &instructions).await,
            FailureStage::Analyze,
            "inference service returned no response",
        )?;

        let feedback: Value = extract_feedback(&response)
            .map_err(|e| Failure::new(FailureStage::Parse, e.to_string()))?;

        let record = record.with_feedback(feedback);
        self.write_record(&key, &record, FailureStage::Save).await?;

        Ok(Stage::Complete(record))
    }

    async fn write_record(
        &self,
        key: &str,
        record: &SubmissionRecord,
        stage: FailureStage,
    ) -> Result<(), Failure> {
        let value = serde_json::to_string(record)
            .map_err(|e| Failure::new(stage, format!("failed to serialize record: {e}")))?;
        self.records
            .set(key, &value)
            .await
            .map_err(|e| Failure::new(stage, format!("record store write failed: {e:#}")))
    }
}
