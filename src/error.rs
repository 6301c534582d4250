//! Error types for the cardgrid library

use thiserror::Error;

/// Result type alias using CardError
pub type Result<T> = std::result::Result<T, CardError>;

/// Errors that can occur while generating card decks
#[derive(Debug, Error)]
pub enum CardError {
    /// Error from the underlying lopdf library
    #[error("PDF operation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Font loading or parsing error
    #[error("font error: {0}")]
    Font(String),

    /// Cell geometry or text fitting error
    #[error("layout calculation failed: {0}")]
    Layout(String),

    /// A background asset could not be read or decoded
    #[error("background image '{path}': {source}")]
    Background {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Image encoding error while embedding a composited background
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error reading inputs or writing the output document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
