//! Progress signal for a pipeline run: a stage tag plus human-readable text.

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    /// Before `run` is called; the pipeline itself never reports it.
    #[allow(dead_code)]
    Idle,
    UploadingDocument,
    ConvertingToImage,
    UploadingImage,
    PreparingRecord,
    Analyzing,
    Complete,
    Failed,
}

impl PipelineStage {
    pub fn message(self) -> &'static str {
        match self {
            PipelineStage::Idle => "Waiting for a resume...",
            PipelineStage::UploadingDocument => "Uploading the file...",
            PipelineStage::ConvertingToImage => "Converting to image...",
            PipelineStage::UploadingImage => "Uploading the image...",
            PipelineStage::PreparingRecord => "Preparing data...",
            PipelineStage::Analyzing => "Analyzing...",
            PipelineStage::Complete => "Analysis complete",
            PipelineStage::Failed => "Error",
        }
    }
}

/// Which step a failed run stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    UploadResume,
    Convert,
    UploadImage,
    Prepare,
    Analyze,
    Parse,
    Save,
}

impl FailureStage {
    pub fn tag(self) -> &'static str {
        match self {
            FailureStage::UploadResume => "upload-resume",
            FailureStage::Convert => "convert",
            FailureStage::UploadImage => "upload-image",
            FailureStage::Prepare => "prepare",
            FailureStage::Analyze => "analyze",
            FailureStage::Parse => "parse",
            FailureStage::Save => "save",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            FailureStage::UploadResume => "Failed to upload file",
            FailureStage::Convert => "Failed to convert PDF to image",
            FailureStage::UploadImage => "Failed to upload image",
            FailureStage::Prepare => "Failed to save submission",
            FailureStage::Analyze => "Failed to analyze resume",
            FailureStage::Parse => "Failed to read analysis",
            FailureStage::Save => "Failed to save analysis",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    pub stage: PipelineStage,
    pub message: String,
}

impl PipelineStatus {
    pub fn entered(stage: PipelineStage) -> Self {
        Self {
            stage,
            message: stage.message().to_string(),
        }
    }

    /// Terminal status for a failed run, e.g. `Error: Failed to convert PDF to image [convert]`.
    pub fn failed(stage: FailureStage) -> Self {
        Self {
            stage: PipelineStage::Failed,
            message: format!("Error: {} [{}]", stage.summary(), stage.tag()),
        }
    }
}

pub type StatusSender = mpsc::UnboundedSender<PipelineStatus>;
pub type StatusReceiver = mpsc::UnboundedReceiver<PipelineStatus>;

pub fn status_channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

/// Drains whatever has been reported so far without waiting.
pub fn drain(receiver: &mut StatusReceiver) -> Vec<PipelineStatus> {
    let mut statuses = Vec::new();
    while let Ok(status) = receiver.try_recv() {
        statuses.push(status);
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_status_names_the_stage() {
        let status = PipelineStatus::failed(FailureStage::Convert);
        assert_eq!(status.stage, PipelineStage::Failed);
        assert!(status.message.starts_with("Error:"));
        assert!(status.message.contains("[convert]"));
    }

    #[test]
    fn test_failure_tags_are_distinct() {
        let tags = [
            FailureStage::UploadResume,
            FailureStage::Convert,
            FailureStage::UploadImage,
            FailureStage::Prepare,
            FailureStage::Analyze,
            FailureStage::Parse,
            FailureStage::Save,
        ]
        .map(FailureStage::tag);
        let mut unique = tags.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), tags.len());
    }

    #[test]
    fn test_failure_stage_serializes_as_tag() {
        assert_eq!(
            serde_json::to_value(FailureStage::UploadResume).unwrap(),
            serde_json::json!("upload-resume")
        );
    }

    #[test]
    fn test_drain_returns_in_order() {
        let (tx, mut rx) = status_channel();
        tx.send(PipelineStatus::entered(PipelineStage::UploadingDocument))
            .unwrap();
        tx.send(PipelineStatus::entered(PipelineStage::ConvertingToImage))
            .unwrap();
        let statuses = drain(&mut rx);
        assert_eq!(statuses[0].message, "Uploading the file...");
        assert_eq!(statuses[1].message, "Converting to image...");
        assert!(drain(&mut rx).is_empty());
    }
}
