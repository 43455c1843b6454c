//! [`DocumentRenderer`] for report surfaces.

use talkreport_core::DocumentRenderer;
use talkreport_domain::constants::REPORT_BACKGROUND_RGB;
use talkreport_domain::{PageLayout, PageSlice, RenderedSurface, Result};
use tracing::debug;

use super::{pdf, png};

/// Encodes report rasters as paged PDF or a single PNG.
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    background: [u8; 3],
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self { background: REPORT_BACKGROUND_RGB }
    }

    /// Colour transparent pixels are flattened onto in PDF pages.
    pub fn with_background(background: [u8; 3]) -> Self {
        Self { background }
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for ReportRenderer {
    fn render_pdf(
        &self,
        surface: &RenderedSurface,
        slices: &[PageSlice],
        layout: &PageLayout,
    ) -> Result<Vec<u8>> {
        let bytes = pdf::write_pdf(surface, slices, layout, self.background)?;
        debug!(pages = slices.len(), bytes = bytes.len(), "Rendered PDF");
        Ok(bytes)
    }

    fn render_png(&self, surface: &RenderedSurface) -> Result<Vec<u8>> {
        let bytes = png::encode_png(surface)?;
        debug!(bytes = bytes.len(), "Rendered PNG");
        Ok(bytes)
    }
}
