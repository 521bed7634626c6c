use thiserror::Error;

/// Errors originating from configuration resolution and the core math.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid fill mode: {0:?} (expected one of: seq, pixel, row, workers)")]
    InvalidFillMode(String),

    #[error("degenerate viewport: {reason}")]
    DegenerateViewport { reason: String },

    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid threshold: {0} (must be > 0.0 and finite)")]
    InvalidThreshold(f64),

    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    #[error("invalid scale factor: {0} (must be >= 1)")]
    InvalidScaleFactor(u32),
}
