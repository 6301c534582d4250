//! Background image cycling and alpha compositing

use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::error::{CardError, Result};

/// Ordered, non-empty list of background assets, cycled by global card
/// index.
///
/// Cycling never resets at page boundaries: two cards on the same page may
/// share a background when the list is shorter than the page capacity.
#[derive(Debug, Clone)]
pub struct BackgroundCycle<T> {
    items: Vec<T>,
}

impl<T> BackgroundCycle<T> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        if items.is_empty() {
            return Err(CardError::Config(
                "BACKGROUNDS must list at least one image".to_string(),
            ));
        }
        Ok(Self { items })
    }

    /// The asset for the i-th card: `items[i mod len]`
    pub fn get(&self, index: usize) -> &T {
        &self.items[index % self.items.len()]
    }

    /// Cycle period
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: construction rejects empty lists
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A background image with its alpha channel scaled down, split into the
/// planes a PDF image XObject needs.
///
/// Every composite call produces an independent buffer; the decoded source
/// is never mutated, so sibling jobs can composite the same file with
/// different alpha values concurrently.
#[derive(Debug, Clone)]
pub struct CompositedImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved 8-bit RGB samples, row-major
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples, row-major
    pub alpha: Vec<u8>,
}

/// Load an image file and scale its alpha channel by `alpha_percent`
/// (0 = fully transparent, 100 = unchanged).
pub fn composite(path: &Path, alpha_percent: u8) -> Result<CompositedImage> {
    let img = image::open(path)
        .map_err(|source| CardError::Background {
            path: path.display().to_string(),
            source,
        })?
        .to_rgba8();
    debug!(path = %path.display(), alpha_percent, "composited background");
    Ok(composite_rgba(&img, alpha_percent))
}

/// Scale the alpha plane of an already-decoded RGBA buffer
pub fn composite_rgba(img: &RgbaImage, alpha_percent: u8) -> CompositedImage {
    let factor = alpha_percent.min(100) as u16;
    let pixel_count = (img.width() * img.height()) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for px in img.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push((px.0[3] as u16 * factor / 100) as u8);
    }

    CompositedImage {
        width: img.width(),
        height: img.height(),
        rgb,
        alpha,
    }
}
