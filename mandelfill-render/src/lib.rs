pub mod adjust;
pub mod buffer;
pub mod color;
pub mod error;
pub mod export;
pub mod renderer;
pub mod strategy;

pub use adjust::Adjustments;
pub use buffer::{PixelGrid, Rgba8};
pub use color::{color_for, hsv_to_rgb, Hsv};
pub use error::RenderError;
pub use export::{encode_image, save_image, tagged_filename, ExportOptions, ImageFormat};
pub use renderer::{render, render_partial, RenderResult, Shader};
pub use strategy::{fill_grid, FillStrategy, PerPixel, PerRow, Sequential, WorkerPool};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
