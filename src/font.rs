//! Font metrics for accurate text measurement and glyph encoding

use std::path::Path;

use crate::constants::DEFAULT_CHAR_WIDTH_RATIO;
use crate::error::{CardError, Result};

/// Trait for measuring text dimensions and encoding text for PDF rendering.
///
/// The card layout only ever needs widths and glyph runs; keeping this a
/// trait lets tests substitute fixed-width metrics for a real font face.
pub trait FontMetrics: Send + Sync {
    /// Width of a single character in points at the given font size
    fn char_width(&self, ch: char, font_size: f32) -> f32;

    /// Total width of a string in points at the given font size
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Encode text for the PDF Tj operator (2-byte big-endian glyph IDs for
    /// Type0 fonts with Identity-H encoding)
    fn encode_text(&self, text: &str) -> Vec<u8>;
}

/// TrueType font metrics using ttf-parser.
///
/// Owns the raw font data and parses it on demand; the data is validated
/// once at construction. The same instance is shared read-only across all
/// render jobs, and the owned bytes are also what gets embedded into each
/// document.
pub struct TtfFontMetrics {
    font_data: Vec<u8>,
    units_per_em: f32,
}

impl TtfFontMetrics {
    /// Create new font metrics from raw TTF font data.
    pub fn new(font_data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&font_data, 0)
            .map_err(|e| CardError::Font(format!("failed to parse font: {e}")))?;
        let units_per_em = face.units_per_em() as f32;
        Ok(Self {
            font_data,
            units_per_em,
        })
    }

    /// Read and parse a font file, failing with the offending path
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| CardError::Font(format!("cannot read '{}': {e}", path.display())))?;
        Self::new(data)
    }

    /// Raw font bytes, for embedding into a document
    pub fn data(&self) -> &[u8] {
        &self.font_data
    }

    fn face(&self) -> ttf_parser::Face<'_> {
        // Data was validated in the constructor
        ttf_parser::Face::parse(&self.font_data, 0).unwrap()
    }
}

impl FontMetrics for TtfFontMetrics {
    fn char_width(&self, ch: char, font_size: f32) -> f32 {
        let face = self.face();
        face.glyph_index(ch)
            .and_then(|gid| face.glyph_hor_advance(gid))
            .map(|advance| advance as f32 / self.units_per_em * font_size)
            .unwrap_or(font_size * DEFAULT_CHAR_WIDTH_RATIO)
    }

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let face = self.face();
        text.chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|advance| advance as f32 / self.units_per_em * font_size)
                    .unwrap_or(font_size * DEFAULT_CHAR_WIDTH_RATIO)
            })
            .sum()
    }

    fn encode_text(&self, text: &str) -> Vec<u8> {
        let face = self.face();
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let glyph_id = face.glyph_index(ch).map(|g| g.0).unwrap_or(0);
            bytes.extend_from_slice(&glyph_id.to_be_bytes());
        }
        bytes
    }
}

impl std::fmt::Debug for TtfFontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFontMetrics")
            .field("units_per_em", &self.units_per_em)
            .field("font_data_len", &self.font_data.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::FontMetrics;

    /// Fixed-width metrics for deterministic layout tests: every character
    /// is half the font size wide, glyphs encode as zero.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedMetrics;

    impl FontMetrics for FixedMetrics {
        fn char_width(&self, _ch: char, font_size: f32) -> f32 {
            font_size * 0.5
        }

        fn text_width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * 0.5
        }

        fn encode_text(&self, text: &str) -> Vec<u8> {
            vec![0; text.chars().count() * 2]
        }
    }

    /// Load a system TTF for tests that need a real face; callers skip when
    /// no font is found.
    pub fn load_test_font() -> Option<Vec<u8>> {
        let paths = [
            "/System/Library/Fonts/Helvetica.ttc",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];
        for path in &paths {
            if let Ok(data) = std::fs::read(path) {
                return Some(data);
            }
        }
        None
    }
}
