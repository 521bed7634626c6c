//! Image export: PNG with embedded render parameters (tEXt chunks), JPEG
//! and GIF.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, RgbaImage};
use tracing::debug;

use mandelfill_core::RenderConfig;

use crate::error::RenderError;

/// Encoders picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Accepts `png`, `.png`, `JPG`, … in any case.
    pub fn from_extension(ext: &str) -> crate::Result<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            _ => Err(RenderError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// 1–100; only used for JPEG.
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { jpeg_quality: 100 }
    }
}

/// Encode `image` into `writer` in the given format.
pub fn encode_image<W: Write>(
    mut writer: W,
    image: &RgbaImage,
    format: ImageFormat,
    config: &RenderConfig,
    options: &ExportOptions,
) -> crate::Result<()> {
    match format {
        ImageFormat::Png => write_png(&mut writer, image, config)?,
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder =
                JpegEncoder::new_with_quality(&mut writer, options.jpeg_quality.clamp(1, 100));
            encoder.encode_image(&rgb)?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut writer);
            encoder.encode_frame(Frame::new(image.clone()))?;
        }
    }
    Ok(())
}

/// Write `image` to `path`, choosing the encoder from the extension.
pub fn save_image(
    image: &RgbaImage,
    path: &Path,
    config: &RenderConfig,
    options: &ExportOptions,
) -> crate::Result<()> {
    let format = ImageFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    encode_image(&mut writer, image, format, config, options)?;
    writer.flush()?;
    debug!(
        "Exported {:?} {}x{} to {}",
        format,
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

/// `dir/name.ext` → `dir/name#i=…_t=…_z=…_x=…_y=….ext`.
pub fn tagged_filename(path: &Path, config: &RenderConfig) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}#{}", parameter_tag(config));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

fn parameter_tag(config: &RenderConfig) -> String {
    format!(
        "i={}_t={}_z={}_x={}_y={}",
        config.max_iterations,
        config.threshold,
        config.zoom,
        config.offset_x,
        config.offset_y
    )
}

fn write_png<W: Write>(writer: W, image: &RgbaImage, config: &RenderConfig) -> crate::Result<()> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "mandelfill".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(config))?;
    for (key, value) in build_metadata_pairs(config) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(image.as_raw())?;
    png_writer.finish()?;
    Ok(())
}

fn build_description(config: &RenderConfig) -> String {
    format!(
        "Mandelbrot - Offset: {} {}i, Zoom: {}, Iterations: {}, Threshold: {}",
        config.offset_x,
        config.offset_y,
        config.zoom,
        config.max_iterations,
        config.threshold,
    )
}

fn build_metadata_pairs(config: &RenderConfig) -> Vec<(String, String)> {
    vec![
        ("Mandelfill.MaxIterations".into(), config.max_iterations.to_string()),
        ("Mandelfill.Threshold".into(), config.threshold.to_string()),
        ("Mandelfill.Zoom".into(), config.zoom.to_string()),
        ("Mandelfill.OffsetX".into(), config.offset_x.to_string()),
        ("Mandelfill.OffsetY".into(), config.offset_y.to_string()),
        ("Mandelfill.HueOffset".into(), config.hue_offset.to_string()),
        ("Mandelfill.Smooth".into(), config.smooth.to_string()),
        ("Mandelfill.FillMode".into(), config.fill_mode.to_string()),
        (
            "Mandelfill.Resolution".into(),
            format!("{}x{}", config.width, config.height),
        ),
    ]
}
