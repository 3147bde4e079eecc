use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub message: InferenceMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceMessage {
    pub content: MessageContent,
}

/// Message content arrives either as one string or as a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentPart {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            part_type: Some("text".to_string()),
            text: Some(text.into()),
        }
    }

    fn is_textual(&self) -> bool {
        self.text.is_some() && self.part_type.as_deref().map_or(true, |t| t == "text")
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("response contained no text content")]
    NoText,

    #[error("response text is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response JSON is not an object")]
    NotAnObject,
}

impl MessageContent {
    /// The whole string, or the first part that carries text.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Parts(parts) => parts
                .iter()
                .find(|p| p.is_textual())
                .and_then(|p| p.text.as_deref()),
        }
    }
}

impl InferenceResponse {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: InferenceMessage {
                content: MessageContent::Text(text.into()),
            },
        }
    }

    pub fn from_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            message: InferenceMessage {
                content: MessageContent::Parts(parts),
            },
        }
    }
}

/// Pulls the feedback object out of a response. Markdown code fences around
/// the JSON are tolerated; anything other than a JSON object is rejected.
pub fn extract_feedback(response: &InferenceResponse) -> Result<Value, ResponseError> {
    let text = response
        .message
        .content
        .first_text()
        .map(strip_json_fences)
        .filter(|t| !t.is_empty())
        .ok_or(ResponseError::NoText)?;

    let value: Value =
        serde_json::from_str(text).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(ResponseError::NotAnObject)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
