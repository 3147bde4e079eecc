//! Document → image rendering. The pipeline only sees the trait; the default
//! backend shells out to poppler's `pdftoppm`.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::document::Document;

pub mod pdftoppm;

pub use pdftoppm::PdftoppmRenderer;

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders the first page of `document` to a PNG. `Ok(None)` when the
    /// renderer produced no image.
    async fn render(&self, document: &Document) -> Result<Option<Document>>;
}
