use std::io::ErrorKind;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::{debug, warn};

use super::DocumentRenderer;
use crate::models::document::Document;

/// Renders page 1 of a PDF with `pdftoppm -png -singlefile` inside a scratch directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    bin: String,
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(bin: impl Into<String>, dpi: u32) -> Self {
        Self {
            bin: bin.into(),
            dpi,
        }
    }
}

#[async_trait]
impl DocumentRenderer for PdftoppmRenderer {
    async fn render(&self, document: &Document) -> Result<Option<Document>> {
        if document.is_empty() {
            return Ok(None);
        }

        let workdir = tempfile::tempdir().context("Failed to create render scratch directory")?;
        let input = workdir.path().join("input.pdf");
        let output_base = workdir.path().join("page");
        tokio::fs::write(&input, &document.bytes)
            .await
            .context("Failed to write document to scratch directory")?;

        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg(&input)
            .arg(&output_base)
            .output()
            .await
            .with_context(|| format!("Failed to spawn '{}'", self.bin))?;

        if !output.status.success() {
            warn!(
                "{} exited with {:?}: {}",
                self.bin,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let image_path = output_base.with_extension("png");
        let bytes = match tokio::fs::read(&image_path).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read rendered image"),
        };

        debug!(
            pdf_size = document.bytes.len(),
            png_size = bytes.len(),
            dpi = self.dpi,
            "Rendered first page"
        );

        Ok(Some(Document::new(
            format!("{}.png", document.stem()),
            "image/png",
            Bytes::from(bytes),
        )))
    }
}
