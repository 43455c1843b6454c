//! Raster helpers shared by the PNG and PDF encoders.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use talkreport_domain::{RenderedSurface, Result, TalkReportError};

use crate::errors::InfraError;

/// Encode the whole surface as an RGBA PNG.
pub(crate) fn encode_png(surface: &RenderedSurface) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(
        surface.pixel_width(),
        surface.pixel_height(),
        surface.pixel_data().to_vec(),
    )
    .ok_or_else(|| TalkReportError::Export("surface buffer does not match its size".into()))?;

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).map_err(|e| TalkReportError::from(InfraError::from(e)))?;
    Ok(out.into_inner())
}

/// RGB bytes of rows `[start_row, start_row + rows)` with alpha composited
/// over `background`.
pub(crate) fn flatten_rows(
    surface: &RenderedSurface,
    start_row: u32,
    rows: u32,
    background: [u8; 3],
) -> Vec<u8> {
    let row_bytes = surface.pixel_width() as usize * 4;
    let start = start_row as usize * row_bytes;
    let end = start + rows as usize * row_bytes;
    let rgba = &surface.pixel_data()[start..end];

    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = u16::from(px[3]);
        for (channel, bg) in px[..3].iter().zip(background) {
            let blended = (u16::from(*channel) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_decodes_to_same_pixels() {
        let pixels = vec![255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 0, 10, 20, 30, 40];
        let surface = RenderedSurface::new(2, 2, pixels.clone()).unwrap();

        let bytes = encode_png(&surface).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn flatten_composites_over_background() {
        let pixels = vec![
            255, 0, 0, 255, // opaque red
            0, 0, 0, 0, // transparent
            0, 0, 0, 255, // opaque black, second row
            255, 255, 255, 0,
        ];
        let surface = RenderedSurface::new(2, 2, pixels).unwrap();

        let first_row = flatten_rows(&surface, 0, 1, [0xF8, 0xF9, 0xFA]);
        assert_eq!(first_row, vec![255, 0, 0, 0xF8, 0xF9, 0xFA]);

        let second_row = flatten_rows(&surface, 1, 1, [0xF8, 0xF9, 0xFA]);
        assert_eq!(second_row, vec![0, 0, 0, 0xF8, 0xF9, 0xFA]);
    }
}
