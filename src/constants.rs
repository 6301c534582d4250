//! Constants for page dimensions and common values

/// Millimetres per PDF point (25.4 mm / 72 pt)
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// PDF points per millimetre
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Default line height multiplier applied to the font size
pub const DEFAULT_LINE_SPACING: f32 = 1.2;

/// Default character width ratio for fallback text estimation
/// (average character width as a fraction of font size)
pub const DEFAULT_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Border stroke width for card cells, in points
pub const DEFAULT_BORDER_WIDTH: f32 = 1.0;

/// JPEG quality used when re-encoding composited backgrounds for embedding
pub const BACKGROUND_JPEG_QUALITY: u8 = 85;
