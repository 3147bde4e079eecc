//! The AI inference collaborator and the shape of what it returns.

use anyhow::Result;
use async_trait::async_trait;

pub mod anthropic;
pub mod response;

pub use anthropic::AnthropicInferenceClient;
pub use response::{ContentPart, InferenceResponse};

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Asks the model to assess the stored document at `document_path`.
    /// `Ok(None)` when the service gave no response.
    async fn feedback(
        &self,
        document_path: &str,
        instructions: &str,
    ) -> Result<Option<InferenceResponse>>;
}
