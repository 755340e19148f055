//! Error types for graphics2d-skia.

use thiserror::Error;

/// Result type alias using Graphics2dError.
pub type Graphics2dResult<T> = Result<T, Graphics2dError>;

/// Errors that can occur in Graphics2D operations.
#[derive(Debug, Error)]
pub enum Graphics2dError {
    /// Invalid surface dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A required argument was absent.
    #[error("Null argument: {0}")]
    NullArgument(&'static str),

    /// An out-of-range or otherwise malformed argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid gradient stop fraction (must be 0.0-1.0 and increasing).
    #[error("Invalid gradient stop fraction: {0} (must be 0.0-1.0 and increasing)")]
    InvalidGradientStop(f32),

    /// Unknown line cap or line join code.
    #[error("Invalid stroke attribute: {kind} code {code}")]
    InvalidStrokeAttribute { kind: &'static str, code: i32 },

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// Typeface resolution or glyph outline error.
    #[error("Font error: {0}")]
    FontError(String),

    /// PNG encoding failed.
    #[error("PNG encoding error: {0}")]
    PngError(String),
}

impl From<png::EncodingError> for Graphics2dError {
    fn from(err: png::EncodingError) -> Self {
        Graphics2dError::PngError(err.to_string())
    }
}
