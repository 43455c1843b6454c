//! Port interfaces for document export
//!
//! Rasterization and file encoding live in infra; core only decides how the
//! raster is split into pages.

use async_trait::async_trait;
use talkreport_domain::{PageLayout, PageSlice, RenderedSurface, Result};

/// Produces a raster snapshot of an on-screen element.
#[async_trait]
pub trait SurfaceCapture: Send + Sync {
    /// Capture the element addressed by `element_id`.
    async fn capture(&self, element_id: &str) -> Result<RenderedSurface>;
}

/// Encodes a captured surface into a file format.
pub trait DocumentRenderer: Send + Sync {
    /// One page per slice, each slice drawn at the top-left margin.
    fn render_pdf(
        &self,
        surface: &RenderedSurface,
        slices: &[PageSlice],
        layout: &PageLayout,
    ) -> Result<Vec<u8>>;

    /// The whole surface as a single image.
    fn render_png(&self, surface: &RenderedSurface) -> Result<Vec<u8>>;
}
