//! Surface capture from pre-rendered report images.
//!
//! The report card is rendered elsewhere and saved as `<element-id>.png`
//! under one directory; capturing an element decodes that file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use talkreport_core::SurfaceCapture;
use talkreport_domain::{RenderedSurface, Result, TalkReportError};
use tokio::task;
use tracing::debug;

use crate::errors::InfraError;

/// [`SurfaceCapture`] reading `<root>/<element_id>.png`.
#[derive(Debug, Clone)]
pub struct ImageFileCapture {
    root: PathBuf,
}

impl ImageFileCapture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, element_id: &str) -> Result<PathBuf> {
        let valid = !element_id.is_empty()
            && element_id != "."
            && element_id != ".."
            && !element_id.contains(['/', '\\']);
        if !valid {
            return Err(TalkReportError::InvalidInput(format!(
                "invalid element id '{element_id}'"
            )));
        }
        Ok(self.root.join(format!("{element_id}.png")))
    }
}

#[async_trait]
impl SurfaceCapture for ImageFileCapture {
    async fn capture(&self, element_id: &str) -> Result<RenderedSurface> {
        let path = self.path_for(element_id)?;
        if !path.is_file() {
            return Err(TalkReportError::NotFound(format!(
                "no rendered surface for element '{element_id}' at {}",
                path.display()
            )));
        }

        let surface = task::spawn_blocking(move || -> Result<RenderedSurface> {
            let image = image::open(&path).map_err(InfraError::from)?.to_rgba8();
            let (width, height) = image.dimensions();
            RenderedSurface::new(width, height, image.into_raw())
        })
        .await
        .map_err(|e| TalkReportError::Internal(format!("surface decode task failed: {e}")))??;

        debug!(
            element_id,
            width = surface.pixel_width(),
            height = surface.pixel_height(),
            "Captured surface"
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn decodes_png_into_rgba_surface() {
        let dir = TempDir::new().unwrap();
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(2, 1, Rgba([1, 2, 3, 4]));
        image.save(dir.path().join("report-1.png")).unwrap();

        let surface = ImageFileCapture::new(dir.path()).capture("report-1").await.unwrap();
        assert_eq!((surface.pixel_width(), surface.pixel_height()), (3, 2));
        assert_eq!(&surface.pixel_data()[20..24], &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn missing_element_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = ImageFileCapture::new(dir.path()).capture("nope").await.unwrap_err();
        assert!(matches!(err, TalkReportError::NotFound(_)));
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let capture = ImageFileCapture::new(dir.path());
        for id in ["../secret", "a/b", "..", ""] {
            let err = capture.capture(id).await.unwrap_err();
            assert!(matches!(err, TalkReportError::InvalidInput(_)), "{id}");
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_export_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        let err = ImageFileCapture::new(dir.path()).capture("broken").await.unwrap_err();
        assert!(matches!(err, TalkReportError::Export(_)));
    }
}
