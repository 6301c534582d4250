//! Grid pagination: mapping a linear card index onto fixed-size pages

use crate::config::PageProfile;
use crate::error::{CardError, Result};

/// Fixed grid shared by every page of every profile in one run.
///
/// All physical dimensions are millimetres.
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Space inside each cell, between border and text
    pub padding_mm: f32,
    /// Space between the page edge and the grid
    pub spacing_mm: f32,
}

impl GridSpec {
    pub fn cells_per_page(&self) -> usize {
        self.rows * self.cols
    }

    /// Validate the grid independently of any page size
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CardError::Config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.padding_mm < 0.0 || self.spacing_mm < 0.0 {
            return Err(CardError::Config(
                "cell padding and spacing must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Cell dimensions for one page profile, failing fast when the page is
    /// too small for the configured grid.
    pub fn cell_size(&self, profile: &PageProfile) -> Result<(f32, f32)> {
        let w = (profile.width_mm - 2.0 * self.spacing_mm) / self.cols as f32;
        let h = (profile.height_mm - 2.0 * self.spacing_mm) / self.rows as f32;
        if w <= 0.0 || h <= 0.0 {
            return Err(CardError::Config(format!(
                "page '{}' ({} x {} mm) leaves no room for a {}x{} grid with {} mm spacing",
                profile.key, profile.width_mm, profile.height_mm, self.rows, self.cols,
                self.spacing_mm
            )));
        }
        Ok((w, h))
    }
}

/// Position of one card in the paginated grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSlot {
    pub page: usize,
    pub row: usize,
    pub col: usize,
    /// True when the caller must open a fresh physical page before drawing
    pub is_new_page: bool,
}

/// Derived placement of one cell on its page, in millimetres from the
/// top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Map a linear item index to its page, row, and column.
///
/// Pages fill row-major. Index 0 never signals a new page: the first page
/// is already open.
pub fn locate(index: usize, grid: &GridSpec) -> CellSlot {
    let per_page = grid.cells_per_page();
    let local = index % per_page;
    CellSlot {
        page: index / per_page,
        row: local / grid.cols,
        col: local % grid.cols,
        is_new_page: index > 0 && local == 0,
    }
}

/// Compute the page-relative rectangle for a slot given the cell size
pub fn cell_geometry(slot: CellSlot, grid: &GridSpec, cell_w: f32, cell_h: f32) -> CellGeometry {
    CellGeometry {
        x: grid.spacing_mm + slot.col as f32 * cell_w,
        y: grid.spacing_mm + slot.row as f32 * cell_h,
        w: cell_w,
        h: cell_h,
    }
}
