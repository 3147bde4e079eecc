use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine as _;
use tracing::{debug, warn};

use super::{ContentPart, InferenceClient, InferenceResponse};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{Base64Source, InputBlock, LlmClient, LlmResponse};
use crate::models::document::content_type_for;
use crate::storage::DocumentStore;

/// Inference collaborator backed by Claude: fetches the stored document and
/// attaches it to the instructions as a base64 block.
#[derive(Clone)]
pub struct AnthropicInferenceClient {
    llm: LlmClient,
    documents: Arc<dyn DocumentStore>,
}

impl AnthropicInferenceClient {
    pub fn new(llm: LlmClient, documents: Arc<dyn DocumentStore>) -> Self {
        Self { llm, documents }
    }
}

/// PDFs go in a `document` block, images in an `image` block.
fn attachment_block(path: &str, bytes: &[u8]) -> InputBlock {
    let media_type = content_type_for(path);
    let source = Base64Source::new(
        media_type,
        base64::engine::general_purpose::STANDARD.encode(bytes),
    );
    if media_type.starts_with("image/") {
        InputBlock::Image { source }
    } else {
        InputBlock::Document { source }
    }
}

fn into_inference_response(response: LlmResponse) -> Option<InferenceResponse> {
    if response.content.is_empty() {
        return None;
    }
    let parts = response
        .content
        .into_iter()
        .map(|block| ContentPart {
            part_type: Some(block.block_type),
            text: block.text,
        })
        .collect();
    Some(InferenceResponse::from_parts(parts))
}

#[async_trait]
impl InferenceClient for AnthropicInferenceClient {
    async fn feedback(
        &self,
        document_path: &str,
        instructions: &str,
    ) -> Result<Option<InferenceResponse>> {
        let Some(bytes) = self.documents.read(document_path).await? else {
            warn!("Document {document_path} not found in store; nothing to analyze");
            return Ok(None);
        };

        debug!(
            "Requesting feedback on {document_path} ({} bytes)",
            bytes.len()
        );

        let blocks = [
            attachment_block(document_path, &bytes),
            InputBlock::Text {
                text: instructions.to_string(),
            },
        ];

        let response = self
            .llm
            .call(&blocks, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| anyhow::anyhow!("Feedback LLM call failed: {e}"))?;

        Ok(into_inference_response(response))
    }
}
