//! Color, alignment, and card styling structures

use serde::Deserialize;

use crate::error::{CardError, Result};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values should be 0.0-1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parse a `#rrggbb` hex color string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CardError::Config(format!(
                "'{hex}' is not a #rrggbb color"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| CardError::Config(format!("'{hex}': {e}")))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Resolved styling shared by every card in one run
#[derive(Debug, Clone, Copy)]
pub struct CardStyle {
    pub border_color: Color,
    pub font_color: Color,
    /// Background opacity in percent, 0 = fully transparent, 100 = unchanged
    pub background_alpha: u8,
    pub text_align: Alignment,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            border_color: Color::black(),
            font_color: Color::black(),
            background_alpha: 100,
            text_align: Alignment::Center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_parses_channels() {
        let c = Color::from_hex("#495057").unwrap();
        assert!((c.r - 0x49 as f32 / 255.0).abs() < 1e-6);
        assert!((c.g - 0x50 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0x57 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_hex_accepts_missing_hash() {
        assert!(Color::from_hex("ffffff").is_ok());
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_alignment_deserializes_lowercase() {
        let a: Alignment = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(a, Alignment::Right);
    }
}
