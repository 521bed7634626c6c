pub mod complex;
pub mod config;
pub mod error;
pub mod escape;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use config::{FillMode, PartialRenderConfig, PlaneRange, RenderConfig};
pub use error::CoreError;
pub use escape::{escape_count, stability, EscapeParams, FractalSample};
pub use viewport::{map_to_plane, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
