use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mandelfill_core::{PartialRenderConfig, PlaneRange, RenderConfig};
use mandelfill_render::{render, save_image, tagged_filename, Adjustments, ExportOptions};

/// Render the Mandelbrot set to an image file.
#[derive(Debug, Parser)]
#[command(name = "mandelfill", version, about, allow_negative_numbers = true)]
struct Args {
    /// Output path; the extension picks the format (png, jpg, gif).
    #[arg(long, default_value = "mandelbrot.png")]
    out: PathBuf,

    /// Maximum iterations per pixel.
    #[arg(long)]
    iter: Option<u32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Escape radius squared.
    #[arg(long)]
    threshold: Option<f64>,

    /// Threads used by the `workers` fill mode.
    #[arg(long)]
    workers: Option<usize>,

    /// Job queue capacity for the `workers` fill mode; 0 is a rendezvous.
    #[arg(long)]
    queue: Option<usize>,

    /// Multiplies width and height.
    #[arg(long)]
    scale: Option<u32>,

    /// Fill mode: seq, pixel, row or workers.
    #[arg(long)]
    mode: Option<String>,

    #[arg(long)]
    zoom: Option<f64>,

    /// Hue rotation in degrees.
    #[arg(long)]
    hue: Option<f64>,

    #[arg(long)]
    offset_x: Option<f64>,

    #[arg(long)]
    offset_y: Option<f64>,

    /// Continuous escape count instead of the integer one.
    #[arg(long)]
    smooth: bool,

    /// Use the [-2.5, 1] × [-1, 1] plane instead of [-1, 1]².
    #[arg(long)]
    classic: bool,

    /// JPEG quality, 1 to 100.
    #[arg(long, default_value_t = 100)]
    quality: u8,

    /// Contrast adjustment in percent.
    #[arg(long, default_value_t = 2.0)]
    contrast: f32,

    /// Brightness adjustment in percent.
    #[arg(long, default_value_t = 0.0)]
    brightness: f32,

    /// Write to `--out` as given instead of tagging the name with parameters.
    #[arg(long)]
    no_tag: bool,

    /// JSON file with render settings; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// The render settings given on the command line.
    fn overrides(&self) -> PartialRenderConfig {
        PartialRenderConfig {
            width: self.width,
            height: self.height,
            threshold: self.threshold,
            max_iterations: self.iter,
            worker_count: self.workers,
            queue_capacity: self.queue,
            scale_factor: self.scale,
            fill_mode: self.mode.clone(),
            zoom: self.zoom,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            hue_offset: self.hue,
            smooth: self.smooth.then_some(true),
            x_range: self.classic.then_some(PlaneRange::CLASSIC_X),
            y_range: None,
        }
    }

    fn resolve(&self) -> Result<RenderConfig> {
        let file = match &self.config {
            Some(path) => load_config(path)?,
            None => PartialRenderConfig::default(),
        };
        let config = self
            .overrides()
            .or(file)
            .resolve(&RenderConfig::default())
            .context("Invalid render settings")?;
        Ok(config)
    }

    fn output_path(&self, config: &RenderConfig) -> PathBuf {
        if self.no_tag {
            self.out.clone()
        } else {
            tagged_filename(&self.out, config)
        }
    }
}

fn load_config(path: &Path) -> Result<PartialRenderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve()?;
    info!(
        width = config.width,
        height = config.height,
        mode = %config.fill_mode,
        iterations = config.max_iterations,
        "Rendering"
    );

    let result = render(&config)?;
    info!(
        elapsed_ms = result.elapsed.as_millis(),
        "Time taken to create image"
    );

    let image = Adjustments::new(args.contrast, args.brightness).apply(&result.grid);

    let path = args.output_path(&result.config);
    let start = Instant::now();
    let options = ExportOptions {
        jpeg_quality: args.quality,
    };
    save_image(&image, &path, &result.config, &options)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    info!(
        elapsed_ms = start.elapsed().as_millis(),
        path = %path.display(),
        "Time taken to save image"
    );

    Ok(())
}
