//! Slicing a tall raster into fixed-size pages.
//!
//! The surface is scaled so its width fills the printable width; the scaled
//! height is then cut into page-sized bands. Band edges are snapped down to
//! whole source rows so every row lands on exactly one page.

use talkreport_domain::{PageLayout, PageSlice, RenderedSurface, TalkReportError};
use thiserror::Error;

/// Tolerance for float noise when the content is an exact page multiple.
const PAGE_COUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaginationError {
    #[error("surface has no area ({width}x{height})")]
    EmptyInput { width: u32, height: u32 },

    #[error("invalid page layout: {0}")]
    InvalidLayout(String),
}

impl From<PaginationError> for TalkReportError {
    fn from(err: PaginationError) -> Self {
        Self::Export(err.to_string())
    }
}

/// Cut `surface` into pages of `layout`.
///
/// # Errors
/// `EmptyInput` for a zero-area surface; `InvalidLayout` when the margins
/// leave no printable area or a page would hold less than one source row.
pub fn paginate(
    surface: &RenderedSurface,
    layout: &PageLayout,
) -> Result<Vec<PageSlice>, PaginationError> {
    paginate_dimensions(surface.pixel_width(), surface.pixel_height(), layout)
}

/// [`paginate`] on bare dimensions.
///
/// # Errors
/// See [`paginate`].
pub fn paginate_dimensions(
    pixel_width: u32,
    pixel_height: u32,
    layout: &PageLayout,
) -> Result<Vec<PageSlice>, PaginationError> {
    if pixel_width == 0 || pixel_height == 0 {
        return Err(PaginationError::EmptyInput { width: pixel_width, height: pixel_height });
    }

    let content_width_mm = layout.content_width_mm();
    let content_height_mm = layout.content_height_mm();
    if !(content_width_mm.is_finite() && content_width_mm > 0.0) {
        return Err(PaginationError::InvalidLayout(format!(
            "content width {content_width_mm}mm (page {}mm, margin {}mm)",
            layout.page_width_mm, layout.margin_mm
        )));
    }
    if !(content_height_mm.is_finite() && content_height_mm > 0.0) {
        return Err(PaginationError::InvalidLayout(format!(
            "content height {content_height_mm}mm (page {}mm, margin {}mm)",
            layout.page_height_mm, layout.margin_mm
        )));
    }

    let height = f64::from(pixel_height);
    let scale = content_width_mm / f64::from(pixel_width);
    let total_mm = height * scale;

    if total_mm <= content_height_mm {
        return Ok(vec![PageSlice {
            page_index: 0,
            source_y_offset_px: 0,
            source_height_px: pixel_height,
            dest_height_mm: total_mm,
        }]);
    }

    let rows_per_page = content_height_mm / scale;
    if rows_per_page < 1.0 {
        return Err(PaginationError::InvalidLayout(format!(
            "a {content_height_mm}mm page holds {rows_per_page:.3} source rows"
        )));
    }

    let pages = (total_mm / content_height_mm - PAGE_COUNT_EPSILON).ceil() as usize;
    // Boundaries round down, so every page starts on a row below the last
    // one and no page is empty.
    let row_at = |page: usize| -> u32 {
        ((page as f64 * rows_per_page).floor() as u32).min(pixel_height - 1)
    };

    let slices = (0..pages)
        .map(|k| {
            let start = row_at(k);
            let end = if k + 1 == pages { pixel_height } else { row_at(k + 1) };
            let dest_top_mm = k as f64 * content_height_mm;
            PageSlice {
                page_index: k,
                source_y_offset_px: start,
                source_height_px: end - start,
                dest_height_mm: content_height_mm.min(total_mm - dest_top_mm),
            }
        })
        .collect();

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageLayout {
        PageLayout::a4(5.0)
    }

    fn assert_contiguous(slices: &[PageSlice], pixel_height: u32) {
        let mut expected_offset = 0;
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.page_index, i);
            assert_eq!(slice.source_y_offset_px, expected_offset);
            assert!(slice.source_height_px > 0);
            expected_offset = slice.source_end_px();
        }
        assert_eq!(expected_offset, pixel_height);
    }

    #[test]
    fn short_surface_is_one_page() {
        let slices = paginate_dimensions(800, 1000, &a4()).unwrap();

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].source_y_offset_px, 0);
        assert_eq!(slices[0].source_height_px, 1000);
        assert!((slices[0].dest_height_mm - 250.0).abs() < 1e-9);
    }

    #[test]
    fn tall_surface_spans_four_pages() {
        let slices = paginate_dimensions(800, 4000, &a4()).unwrap();

        assert_eq!(slices.len(), 4);
        assert_contiguous(&slices, 4000);
        assert_eq!(
            slices.iter().map(|s| s.source_y_offset_px).collect::<Vec<_>>(),
            vec![0, 1148, 2296, 3444]
        );
        assert_eq!(slices[3].source_height_px, 556);
        assert!((slices[3].dest_height_mm - 139.0).abs() < 1e-9);
        assert!(slices[..3].iter().all(|s| (s.dest_height_mm - 287.0).abs() < 1e-9));
    }

    #[test]
    fn dest_heights_sum_to_scaled_height() {
        for (w, h) in [(800, 4000), (1240, 9999), (333, 7777), (1, 5000)] {
            let slices = paginate_dimensions(w, h, &a4()).unwrap();
            let total: f64 = slices.iter().map(|s| s.dest_height_mm).sum();
            let expected = f64::from(h) * 200.0 / f64::from(w);
            assert!((total - expected).abs() < 1e-6, "{w}x{h}: {total} vs {expected}");
        }
    }

    #[test]
    fn source_rows_cover_surface_exactly() {
        for (w, h) in [(800, 1148), (800, 1149), (800, 2296), (1024, 31_337), (7, 100_000)] {
            let slices = paginate_dimensions(w, h, &a4()).unwrap();
            assert_contiguous(&slices, h);
        }
    }

    #[test]
    fn exact_page_multiple_has_no_empty_tail() {
        // 800px wide at 0.25mm/px: 1148 rows fill one 287mm page exactly.
        let slices = paginate_dimensions(800, 2296, &a4()).unwrap();
        assert_eq!(slices.len(), 2);
        assert_contiguous(&slices, 2296);
    }

    #[test]
    fn pagination_is_deterministic() {
        let first = paginate_dimensions(913, 12_345, &a4()).unwrap();
        let second = paginate_dimensions(913, 12_345, &a4()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_area_is_rejected() {
        assert_eq!(
            paginate_dimensions(0, 100, &a4()),
            Err(PaginationError::EmptyInput { width: 0, height: 100 })
        );
        assert!(matches!(
            paginate_dimensions(100, 0, &a4()),
            Err(PaginationError::EmptyInput { .. })
        ));
    }

    #[test]
    fn oversized_margin_is_rejected() {
        let layout = PageLayout { page_width_mm: 210.0, page_height_mm: 297.0, margin_mm: 105.0 };
        assert!(matches!(
            paginate_dimensions(800, 1000, &layout),
            Err(PaginationError::InvalidLayout(_))
        ));
    }

    #[test]
    fn sub_row_pages_are_rejected() {
        // One source pixel is 200mm tall, more than the 90mm content height.
        let layout = PageLayout { page_width_mm: 210.0, page_height_mm: 100.0, margin_mm: 5.0 };
        assert!(matches!(
            paginate_dimensions(1, 10, &layout),
            Err(PaginationError::InvalidLayout(_))
        ));
    }

    #[test]
    fn surface_wrapper_matches_dimensions() {
        let surface = RenderedSurface::new(2, 3, vec![0; 24]).unwrap();
        assert_eq!(paginate(&surface, &a4()).unwrap(), paginate_dimensions(2, 3, &a4()).unwrap());
    }
}
