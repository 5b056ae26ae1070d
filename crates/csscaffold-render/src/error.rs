//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while generating gradient images.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Encoding the image failed.
    #[error("failed to encode gradient image: {0}")]
    Image(#[from] image::ImageError),

    /// Writing the image file failed.
    #[error("failed to write gradient image: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid image dimensions (zero, or larger than `MAX_GRADIENT_DIMENSION`).
    #[error("invalid gradient dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The gradient has no color stops to interpolate.
    #[error("gradient has no color stops")]
    EmptyStops,
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
