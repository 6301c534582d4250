//! The narrow document-drawing capability the card renderer draws into
//!
//! The core never touches the concrete PDF backend directly: everything it
//! needs is expressed by [`Canvas`], so layout logic can be tested against a
//! recording mock and the lopdf implementation stays in one module.

use std::path::Path;

use crate::background::CompositedImage;
use crate::error::Result;
use crate::grid::CellGeometry;
use crate::style::{Alignment, Color};

/// Opaque handle to an image resource registered with a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle(pub(crate) usize);

/// Placement of a word-wrapped text block, in millimetres from the page's
/// top-left corner
#[derive(Debug, Clone, Copy)]
pub struct TextBlock {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub line_height_mm: f32,
    pub align: Alignment,
    pub color: Color,
}

/// Document canvas capability.
///
/// Coordinates are millimetres measured from the top-left page corner;
/// implementations own any unit or axis conversion their backend needs.
/// A canvas always starts with one page open.
pub trait Canvas {
    /// Open a fresh physical page; subsequent drawing lands on it
    fn add_page(&mut self) -> Result<()>;

    /// Number of pages opened so far (at least 1)
    fn page_count(&self) -> usize;

    /// Register an image resource for later placement
    fn register_image(&mut self, image: &CompositedImage) -> Result<ImageHandle>;

    /// Place a registered image to fill the given rectangle
    fn place_image(&mut self, handle: ImageHandle, rect: CellGeometry) -> Result<()>;

    /// Stroke a rectangle outline
    fn stroke_rect(&mut self, rect: CellGeometry, color: Color) -> Result<()>;

    /// Measurement-only word wrap: how many lines `text` needs at the
    /// current font within `width_mm`, without drawing anything
    fn measure_lines(&self, text: &str, width_mm: f32) -> usize;

    /// Active font size in points
    fn font_size_pt(&self) -> f32;

    /// Draw word-wrapped, aligned text starting at the block's top-left
    fn draw_text_block(&mut self, text: &str, block: TextBlock) -> Result<()>;

    /// Flush the document to a named artifact; no drawing is permitted
    /// afterwards
    fn save(&mut self, path: &Path) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use super::*;
    use crate::constants::PT_PER_MM;
    use crate::font::testing::FixedMetrics;
    use crate::text::wrap_text_with_metrics;

    /// One recorded drawing side effect
    #[derive(Debug, Clone, PartialEq)]
    pub enum CanvasOp {
        AddPage,
        PlaceImage { handle: ImageHandle, rect: CellGeometry },
        StrokeRect { rect: CellGeometry },
        Text { text: String, x_mm: f32, y_mm: f32, width_mm: f32 },
        Save(PathBuf),
    }

    /// Canvas mock that records every operation and measures text with
    /// fixed-width metrics (half the font size per character).
    pub struct RecordingCanvas {
        pub font_size_pt: f32,
        pub ops: Vec<CanvasOp>,
        pub pages: usize,
        images: usize,
    }

    impl RecordingCanvas {
        pub fn new(font_size_pt: f32) -> Self {
            Self {
                font_size_pt,
                ops: Vec::new(),
                pages: 1,
                images: 0,
            }
        }

        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    CanvasOp::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn add_page(&mut self) -> Result<()> {
            self.pages += 1;
            self.ops.push(CanvasOp::AddPage);
            Ok(())
        }

        fn page_count(&self) -> usize {
            self.pages
        }

        fn register_image(&mut self, _image: &CompositedImage) -> Result<ImageHandle> {
            let handle = ImageHandle(self.images);
            self.images += 1;
            Ok(handle)
        }

        fn place_image(&mut self, handle: ImageHandle, rect: CellGeometry) -> Result<()> {
            self.ops.push(CanvasOp::PlaceImage { handle, rect });
            Ok(())
        }

        fn stroke_rect(&mut self, rect: CellGeometry, _color: Color) -> Result<()> {
            self.ops.push(CanvasOp::StrokeRect { rect });
            Ok(())
        }

        fn measure_lines(&self, text: &str, width_mm: f32) -> usize {
            wrap_text_with_metrics(text, width_mm * PT_PER_MM, self.font_size_pt, &FixedMetrics)
                .len()
        }

        fn font_size_pt(&self) -> f32 {
            self.font_size_pt
        }

        fn draw_text_block(&mut self, text: &str, block: TextBlock) -> Result<()> {
            self.ops.push(CanvasOp::Text {
                text: text.to_string(),
                x_mm: block.x_mm,
                y_mm: block.y_mm,
                width_mm: block.width_mm,
            });
            Ok(())
        }

        fn save(&mut self, path: &Path) -> Result<()> {
            self.ops.push(CanvasOp::Save(path.to_path_buf()));
            Ok(())
        }
    }
}
