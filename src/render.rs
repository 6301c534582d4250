//! Card rendering: one cell, and one profile's full document

use tracing::{debug, trace};

use crate::background::BackgroundCycle;
use crate::canvas::{Canvas, ImageHandle, TextBlock};
use crate::config::PageProfile;
use crate::error::Result;
use crate::grid::{self, CellGeometry, GridSpec};
use crate::layout::fit_text;
use crate::style::CardStyle;

/// Draw one card into its cell: background, border, then vertically
/// centered text.
///
/// Failures propagate; a card is never retried and an unrenderable card
/// aborts its profile's job.
pub fn render_cell(
    canvas: &mut dyn Canvas,
    geometry: CellGeometry,
    text: &str,
    background: ImageHandle,
    style: &CardStyle,
    padding_mm: f32,
    line_spacing: f32,
) -> Result<()> {
    canvas.place_image(background, geometry)?;
    canvas.stroke_rect(geometry, style.border_color)?;

    let fit = fit_text(canvas, text, &geometry, padding_mm, line_spacing)?;
    canvas.draw_text_block(
        text,
        TextBlock {
            x_mm: geometry.x + padding_mm,
            y_mm: geometry.y + padding_mm + fit.vertical_offset,
            width_mm: fit.draw_width,
            line_height_mm: fit.line_height,
            align: style.text_align,
            color: style.font_color,
        },
    )?;
    trace!(x = geometry.x, y = geometry.y, lines = fit.lines, "rendered cell");
    Ok(())
}

/// Render every card of one profile onto the canvas, opening pages as the
/// grid fills.
///
/// Items are drawn strictly in source order; the background cycle advances
/// with the global item index. An empty item list leaves the document's
/// single initial page empty.
pub fn render_document(
    canvas: &mut dyn Canvas,
    profile: &PageProfile,
    grid: &GridSpec,
    items: &[String],
    backgrounds: &BackgroundCycle<ImageHandle>,
    style: &CardStyle,
    line_spacing: f32,
) -> Result<()> {
    let (cell_w, cell_h) = grid.cell_size(profile)?;

    for (index, text) in items.iter().enumerate() {
        let slot = grid::locate(index, grid);
        if slot.is_new_page {
            canvas.add_page()?;
            debug!(page = slot.page + 1, "opened page");
        }
        let geometry = grid::cell_geometry(slot, grid, cell_w, cell_h);
        render_cell(
            canvas,
            geometry,
            text,
            *backgrounds.get(index),
            style,
            grid.padding_mm,
            line_spacing,
        )?;
    }

    debug!(cards = items.len(), pages = canvas.page_count(), "rendered document");
    Ok(())
}
