use std::time::{Duration, Instant};

use tracing::{debug, info};

use mandelfill_core::{EscapeParams, FractalSample, PartialRenderConfig, RenderConfig, Viewport};

use crate::buffer::{PixelGrid, Rgba8};
use crate::color::color_for;
use crate::strategy::fill_grid;

/// The per-cell pipeline: viewport mapper → escape-time engine → color
/// mapper. Holds nothing mutable, so one shader serves every task.
#[derive(Debug, Clone, Copy)]
pub struct Shader {
    viewport: Viewport,
    params: EscapeParams,
    hue_offset: f64,
}

impl Shader {
    /// Build the shader for a config, rejecting degenerate viewports.
    pub fn new(config: &RenderConfig) -> crate::Result<Self> {
        Ok(Self {
            viewport: Viewport::from_config(config)?,
            params: EscapeParams::from_config(config),
            hue_offset: config.hue_offset,
        })
    }

    /// Full sample for `(px, py)`, before coloring.
    #[inline]
    pub fn sample(&self, px: u32, py: u32) -> FractalSample {
        FractalSample::compute(self.viewport.pixel_to_complex(px, py), &self.params)
    }

    #[inline]
    pub fn shade(&self, px: u32, py: u32) -> Rgba8 {
        let [r, g, b] = color_for(self.sample(px, py).stability, self.hue_offset);
        [r, g, b, 255]
    }
}

/// A fully populated grid and the config that produced it.
///
/// The config is handed back so callers can tag filenames and metadata
/// with the resolved values.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub grid: PixelGrid,
    pub config: RenderConfig,
    pub elapsed: Duration,
}

/// Render a resolved config.
///
/// The config is validated again before anything is allocated, so an
/// error always means no grid was produced at all.
pub fn render(config: &RenderConfig) -> crate::Result<RenderResult> {
    let start = Instant::now();
    config.validate()?;
    let shader = Shader::new(config)?;

    let mut grid = PixelGrid::new(config.width, config.height);
    debug!(
        width = config.width,
        height = config.height,
        mode = %config.fill_mode,
        max_iterations = config.max_iterations,
        smooth = config.smooth,
        "Starting fill"
    );

    let shade = |px: u32, py: u32| shader.shade(px, py);
    fill_grid(config.fill_mode, &mut grid, config, &shade);

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        width = config.width,
        height = config.height,
        mode = %config.fill_mode,
        "Render complete"
    );

    Ok(RenderResult {
        grid,
        config: config.clone(),
        elapsed,
    })
}

/// Resolve `partial` against `defaults`, then render.
pub fn render_partial(
    partial: &PartialRenderConfig,
    defaults: &RenderConfig,
) -> crate::Result<RenderResult> {
    let config = partial.resolve(defaults)?;
    render(&config)
}
