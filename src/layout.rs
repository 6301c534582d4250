//! Cell text fitting: measuring wrapped text and centering it vertically

use tracing::trace;

use crate::canvas::Canvas;
use crate::constants::MM_PER_PT;
use crate::error::{CardError, Result};
use crate::grid::CellGeometry;

/// Measured placement of a text block inside one cell, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFit {
    /// Number of wrapped lines
    pub lines: usize,
    /// Height of one text line
    pub line_height: f32,
    /// Distance from the padded cell top to the first line; 0 when the
    /// text overflows the cell
    pub vertical_offset: f32,
    /// Width available for text after padding
    pub draw_width: f32,
}

/// Fit `text` into a cell, measuring with the canvas's font.
///
/// The vertical offset centers the wrapped block inside the padded cell.
/// When the block is taller than the cell the offset clamps to zero so the
/// text overflows downward instead of pushing its first line above the
/// cell top.
pub fn fit_text(
    canvas: &dyn Canvas,
    text: &str,
    geometry: &CellGeometry,
    padding_mm: f32,
    line_spacing: f32,
) -> Result<TextFit> {
    let draw_width = geometry.w - 2.0 * padding_mm;
    let draw_height = geometry.h - 2.0 * padding_mm;
    if draw_width <= 0.0 || draw_height <= 0.0 {
        return Err(CardError::Layout(format!(
            "cell padding {padding_mm} mm leaves no drawable area in a {} x {} mm cell",
            geometry.w, geometry.h
        )));
    }

    let lines = canvas.measure_lines(text, draw_width);
    let line_height = canvas.font_size_pt() * MM_PER_PT * line_spacing;
    let total_text_height = lines as f32 * line_height;
    let vertical_offset = ((draw_height - total_text_height) / 2.0).max(0.0);

    trace!(lines, line_height, vertical_offset, "fitted cell text");

    Ok(TextFit {
        lines,
        line_height,
        vertical_offset,
        draw_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::testing::RecordingCanvas;

    fn cell(w: f32, h: f32) -> CellGeometry {
        CellGeometry { x: 5.0, y: 5.0, w, h }
    }

    #[test]
    fn test_short_text_is_centered() {
        let canvas = RecordingCanvas::new(18.0);
        let fit = fit_text(&canvas, "hi", &cell(66.0, 89.0), 5.0, 1.0).unwrap();
        assert_eq!(fit.lines, 1);
        let expected_line_height = 18.0 * MM_PER_PT;
        assert!((fit.line_height - expected_line_height).abs() < 1e-4);
        let expected_offset = (79.0 - expected_line_height) / 2.0;
        assert!((fit.vertical_offset - expected_offset).abs() < 1e-4);
        assert!((fit.draw_width - 56.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_formula_for_multiline_text() {
        let canvas = RecordingCanvas::new(18.0);
        // FixedMetrics: 9 pt per char at size 18; draw width 56 mm = 158.7 pt
        // holds 17 chars, so this wraps to several lines.
        let text = "this affirmation is long enough to wrap across lines";
        let fit = fit_text(&canvas, text, &cell(66.0, 89.0), 5.0, 1.0).unwrap();
        assert!(fit.lines > 1);
        let total = fit.lines as f32 * fit.line_height;
        assert!(total <= 79.0);
        assert!((fit.vertical_offset - (79.0 - total) / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_overflowing_text_clamps_offset_to_zero() {
        let canvas = RecordingCanvas::new(64.0);
        let text = "a very long affirmation that wraps to many many lines and \
                    cannot possibly fit inside such a small cell at this size";
        let fit = fit_text(&canvas, text, &cell(30.0, 30.0), 5.0, 1.2).unwrap();
        assert!(fit.lines as f32 * fit.line_height > 20.0);
        assert_eq!(fit.vertical_offset, 0.0);
    }

    #[test]
    fn test_oversized_padding_is_fatal() {
        let canvas = RecordingCanvas::new(18.0);
        let result = fit_text(&canvas, "x", &cell(20.0, 20.0), 10.0, 1.0);
        assert!(matches!(result, Err(CardError::Layout(_))));
    }

    #[test]
    fn test_line_spacing_scales_line_height() {
        let canvas = RecordingCanvas::new(18.0);
        let tight = fit_text(&canvas, "hi", &cell(66.0, 89.0), 5.0, 1.0).unwrap();
        let loose = fit_text(&canvas, "hi", &cell(66.0, 89.0), 5.0, 1.2).unwrap();
        assert!((loose.line_height - tight.line_height * 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_fit_is_pure() {
        let canvas = RecordingCanvas::new(24.0);
        let a = fit_text(&canvas, "repeatable", &cell(66.0, 95.0), 5.0, 1.2).unwrap();
        let b = fit_text(&canvas, "repeatable", &cell(66.0, 95.0), 5.0, 1.2).unwrap();
        assert_eq!(a, b);
    }
}
