//! Minimal PDF 1.4 writer for paged raster reports.
//!
//! Each page carries one Flate-compressed RGB image XObject holding that
//! page's source rows, scaled to the printable width and anchored at the
//! top-left margin.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use talkreport_domain::{PageLayout, PageSlice, RenderedSurface, Result, TalkReportError};

use super::png::flatten_rows;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

fn io_error(err: std::io::Error) -> TalkReportError {
    TalkReportError::Export(format!("PDF encoding failed: {err}"))
}

/// Byte buffer that remembers where each indirect object starts.
struct PdfBuffer {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuffer {
    fn new() -> Self {
        let mut bytes = Vec::new();
        // Binary comment marks the file as 8-bit for transfer tools.
        bytes.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self { bytes, offsets: Vec::new() }
    }

    /// Append object `id`. Ids must be written in order starting at 1.
    fn object(&mut self, id: usize, dictionary: &str, stream: Option<&[u8]>) -> Result<()> {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.bytes.len());
        write!(self.bytes, "{id} 0 obj\n{dictionary}").map_err(io_error)?;
        if let Some(data) = stream {
            self.bytes.extend_from_slice(b"\nstream\n");
            self.bytes.extend_from_slice(data);
            self.bytes.extend_from_slice(b"\nendstream");
        }
        self.bytes.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    fn finish(mut self, root_id: usize) -> Result<Vec<u8>> {
        let xref_offset = self.bytes.len();
        let count = self.offsets.len() + 1;
        write!(self.bytes, "xref\n0 {count}\n0000000000 65535 f \n").map_err(io_error)?;
        for offset in &self.offsets {
            write!(self.bytes, "{offset:010} 00000 n \n").map_err(io_error)?;
        }
        write!(
            self.bytes,
            "trailer\n<< /Size {count} /Root {root_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )
        .map_err(io_error)?;
        Ok(self.bytes)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(io_error)?;
    encoder.finish().map_err(io_error)
}

/// Encode `slices` of `surface` as one PDF page each.
pub(crate) fn write_pdf(
    surface: &RenderedSurface,
    slices: &[PageSlice],
    layout: &PageLayout,
    background: [u8; 3],
) -> Result<Vec<u8>> {
    if slices.is_empty() {
        return Err(TalkReportError::Export("no pages to render".into()));
    }

    const CATALOG_ID: usize = 1;
    const PAGES_ID: usize = 2;
    // Each page uses three objects: page, content stream, image.
    let page_id = |k: usize| 3 + 3 * k;

    let page_w = mm_to_pt(layout.page_width_mm);
    let page_h = mm_to_pt(layout.page_height_mm);
    let margin = mm_to_pt(layout.margin_mm);
    let draw_w = mm_to_pt(layout.content_width_mm());

    let mut pdf = PdfBuffer::new();
    pdf.object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"), None)?;

    let kids: Vec<String> = (0..slices.len()).map(|k| format!("{} 0 R", page_id(k))).collect();
    pdf.object(
        PAGES_ID,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), slices.len()),
        None,
    )?;

    for (k, slice) in slices.iter().enumerate() {
        if slice.source_end_px() > surface.pixel_height() || slice.source_height_px == 0 {
            return Err(TalkReportError::Export(format!(
                "page {k} covers rows outside the surface"
            )));
        }
        let id = page_id(k);
        let draw_h = mm_to_pt(slice.dest_height_mm);
        let top = page_h - margin - draw_h;

        pdf.object(
            id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {page_w:.3} {page_h:.3}] \
                 /Resources << /XObject << /Im{k} {image} 0 R >> >> /Contents {content} 0 R >>",
                image = id + 2,
                content = id + 1,
            ),
            None,
        )?;

        let content =
            format!("q\n{draw_w:.3} 0 0 {draw_h:.3} {margin:.3} {top:.3} cm\n/Im{k} Do\nQ\n");
        pdf.object(
            id + 1,
            &format!("<< /Length {} >>", content.len()),
            Some(content.as_bytes()),
        )?;

        let rgb = flatten_rows(surface, slice.source_y_offset_px, slice.source_height_px, background);
        let data = deflate(&rgb)?;
        pdf.object(
            id + 2,
            &format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>",
                surface.pixel_width(),
                slice.source_height_px,
                data.len()
            ),
            Some(&data),
        )?;
    }

    pdf.finish(CATALOG_ID)
}
