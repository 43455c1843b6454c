//! In-memory document ports.

use async_trait::async_trait;
use parking_lot::Mutex;
use talkreport_core::document::{DocumentRenderer, SurfaceCapture};
use talkreport_domain::{PageLayout, PageSlice, RenderedSurface, Result, TalkReportError};

/// Returns a blank surface of fixed size for any element id.
pub struct FixedCapture {
    pub width: u32,
    pub height: u32,
    pub captures: Mutex<Vec<String>>,
}

impl FixedCapture {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, captures: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SurfaceCapture for FixedCapture {
    async fn capture(&self, element_id: &str) -> Result<RenderedSurface> {
        self.captures.lock().push(element_id.to_string());
        if element_id == "missing" {
            return Err(TalkReportError::NotFound(element_id.to_string()));
        }
        let len = self.width as usize * self.height as usize * 4;
        RenderedSurface::new(self.width, self.height, vec![255; len])
    }
}

/// Records the slices it was asked to draw.
#[derive(Default)]
pub struct RecordingRenderer {
    pub pdf_calls: Mutex<Vec<Vec<PageSlice>>>,
    pub png_calls: Mutex<usize>,
}

impl DocumentRenderer for RecordingRenderer {
    fn render_pdf(
        &self,
        _surface: &RenderedSurface,
        slices: &[PageSlice],
        _layout: &PageLayout,
    ) -> Result<Vec<u8>> {
        self.pdf_calls.lock().push(slices.to_vec());
        Ok(b"%PDF-1.4 fake".to_vec())
    }

    fn render_png(&self, _surface: &RenderedSurface) -> Result<Vec<u8>> {
        *self.png_calls.lock() += 1;
        Ok(b"\x89PNG fake".to_vec())
    }
}
