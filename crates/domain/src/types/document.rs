//! Raster surfaces and page geometry for document export.

use serde::{Deserialize, Serialize};

use crate::constants::{A4_HEIGHT_MM, A4_WIDTH_MM, DEFAULT_MARGIN_MM};
use crate::errors::{Result, TalkReportError};

/// Immutable RGBA8 snapshot of a rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSurface {
    pixel_width: u32,
    pixel_height: u32,
    pixel_data: Vec<u8>,
}

impl RenderedSurface {
    /// Wrap RGBA8 pixel data. Zero-area surfaces are accepted here and
    /// rejected by pagination.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `pixel_data` is not `width * height * 4`
    /// bytes long.
    pub fn new(pixel_width: u32, pixel_height: u32, pixel_data: Vec<u8>) -> Result<Self> {
        let expected = u64::from(pixel_width) * u64::from(pixel_height) * 4;
        if pixel_data.len() as u64 != expected {
            return Err(TalkReportError::InvalidInput(format!(
                "surface {pixel_width}x{pixel_height} needs {expected} RGBA bytes, got {}",
                pixel_data.len()
            )));
        }
        Ok(Self { pixel_width, pixel_height, pixel_data })
    }

    #[must_use]
    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    #[must_use]
    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    #[must_use]
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixel_width == 0 || self.pixel_height == 0
    }

    #[must_use]
    pub fn into_pixel_data(self) -> Vec<u8> {
        self.pixel_data
    }
}

/// One page's worth of source rows and where they land on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSlice {
    pub page_index: usize,
    pub source_y_offset_px: u32,
    pub source_height_px: u32,
    pub dest_height_mm: f64,
}

impl PageSlice {
    #[must_use]
    pub fn source_end_px(&self) -> u32 {
        self.source_y_offset_px + self.source_height_px
    }
}

/// Physical page size and uniform margin, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
}

impl PageLayout {
    #[must_use]
    pub fn a4(margin_mm: f64) -> Self {
        Self { page_width_mm: A4_WIDTH_MM, page_height_mm: A4_HEIGHT_MM, margin_mm }
    }

    #[must_use]
    pub fn content_width_mm(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    #[must_use]
    pub fn content_height_mm(&self) -> f64 {
        self.page_height_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4(DEFAULT_MARGIN_MM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let err = RenderedSurface::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, TalkReportError::InvalidInput(_)));
    }

    #[test]
    fn zero_area_surface_is_empty() {
        let surface = RenderedSurface::new(0, 10, Vec::new()).unwrap();
        assert!(surface.is_empty());
    }

    #[test]
    fn default_layout_is_a4_with_5mm_margin() {
        let layout = PageLayout::default();
        assert!((layout.content_width_mm() - 200.0).abs() < f64::EPSILON);
        assert!((layout.content_height_mm() - 287.0).abs() < f64::EPSILON);
    }
}
