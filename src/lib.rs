//! A grid-paginated affirmation card PDF generator built on lopdf
//!
//! Takes an ordered list of short text lines and renders each one as a
//! bordered, background-illustrated card in a fixed rows-by-columns grid,
//! emitting one PDF per requested page-size profile. Independent profiles
//! render concurrently, each into its own document.

pub mod background;
pub mod canvas;
pub mod config;
mod constants;
pub mod error;
pub mod font;
pub mod grid;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod runner;
pub mod style;
pub mod text;

pub use background::{BackgroundCycle, CompositedImage};
pub use canvas::{Canvas, ImageHandle, TextBlock};
pub use config::{Config, PageProfile};
pub use error::{CardError, Result};
pub use font::{FontMetrics, TtfFontMetrics};
pub use grid::{CellGeometry, CellSlot, GridSpec, locate};
pub use layout::{TextFit, fit_text};
pub use pdf::PdfCanvas;
pub use render::{render_cell, render_document};
pub use runner::{JobOutcome, JobState, RenderJob, RunReport, run_all, run_job};
pub use style::{Alignment, CardStyle, Color};
