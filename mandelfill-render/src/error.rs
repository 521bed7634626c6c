use thiserror::Error;

/// Errors originating from the rendering and export pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Core(#[from] mandelfill_core::CoreError),

    #[error("unsupported image format: {0:?} (expected .png, .jpg, .jpeg or .gif)")]
    UnsupportedFormat(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
