use std::path::Path;

use bytes::Bytes;

/// A binary artifact moving through the pipeline: the uploaded résumé or
/// its rendered page image.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Bytes,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// File name without its extension, falling back to "document".
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document")
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guesses a MIME type from a stored path's extension.
pub fn content_type_for(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
