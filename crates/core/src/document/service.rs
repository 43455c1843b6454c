//! Document export service - core business logic

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use talkreport_domain::{PageLayout, Result};
use tracing::{debug, info};

use super::paginator::paginate;
use super::ports::{DocumentRenderer, SurfaceCapture};

/// A rendered PDF and how many pages it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Capture, paginate, and encode an on-screen report.
pub struct DocumentService {
    capture: Arc<dyn SurfaceCapture>,
    renderer: Arc<dyn DocumentRenderer>,
    layout: PageLayout,
}

impl DocumentService {
    pub fn new(capture: Arc<dyn SurfaceCapture>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { capture, renderer, layout: PageLayout::default() }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Paged PDF of `element_id`.
    ///
    /// The surface is captured once; a zero-area capture fails before any
    /// encoding happens.
    pub async fn export_pdf(&self, element_id: &str) -> Result<ExportedDocument> {
        let surface = self.capture.capture(element_id).await?;
        let slices = paginate(&surface, &self.layout)?;
        debug!(
            element_id,
            width = surface.pixel_width(),
            height = surface.pixel_height(),
            pages = slices.len(),
            "Surface paginated"
        );

        let bytes = self.renderer.render_pdf(&surface, &slices, &self.layout)?;
        info!(element_id, pages = slices.len(), bytes = bytes.len(), "PDF exported");
        Ok(ExportedDocument { bytes, page_count: slices.len() })
    }

    /// The PDF from [`export_pdf`](Self::export_pdf), base64-encoded for
    /// transmission.
    pub async fn export_pdf_base64(&self, element_id: &str) -> Result<String> {
        let document = self.export_pdf(element_id).await?;
        Ok(STANDARD.encode(document.bytes))
    }

    /// Single PNG of the whole surface.
    pub async fn export_png(&self, element_id: &str) -> Result<Vec<u8>> {
        let surface = self.capture.capture(element_id).await?;
        if surface.is_empty() {
            return Err(super::PaginationError::EmptyInput {
                width: surface.pixel_width(),
                height: surface.pixel_height(),
            }
            .into());
        }

        let bytes = self.renderer.render_png(&surface)?;
        info!(element_id, bytes = bytes.len(), "PNG exported");
        Ok(bytes)
    }
}
