use crate::complex::Complex;
use crate::config::{PlaneRange, RenderConfig};
use crate::error::CoreError;

/// Linear rescale of a pixel index onto one axis of the complex plane.
///
/// `pixel_extent` is the number of pixels along the axis, so index `0` lands
/// on `range.min` and index `pixel_extent` (one past the last pixel) would
/// land on `range.max`.
#[inline]
pub fn map_to_plane(pixel_index: f64, pixel_extent: f64, range: PlaneRange) -> f64 {
    range.min + (pixel_index / pixel_extent) * range.span()
}

/// Maps raster pixels onto the complex plane.
///
/// The rectangle `x_range × y_range` is stretched over the raster, then
/// divided by `zoom` and translated by `-offset`. Row `0` maps to
/// `y_range.min`; there is no axis flip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub x_range: PlaneRange,
    pub y_range: PlaneRange,
    pub zoom: f64,
    pub offset: Complex,
}

impl Viewport {
    /// Create a viewport, rejecting anything that would divide by zero.
    pub fn new(
        width: u32,
        height: u32,
        x_range: PlaneRange,
        y_range: PlaneRange,
        zoom: f64,
        offset: Complex,
    ) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::DegenerateViewport {
                reason: format!("raster must be non-empty, got {width}×{height}"),
            });
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(CoreError::DegenerateViewport {
                reason: format!("zoom must be positive and finite, got {zoom}"),
            });
        }
        for (axis, range) in [("x", x_range), ("y", y_range)] {
            let span = range.span();
            if span == 0.0 || !span.is_finite() {
                return Err(CoreError::DegenerateViewport {
                    reason: format!(
                        "{axis} range [{}, {}] has no usable extent",
                        range.min, range.max
                    ),
                });
            }
        }
        if !(offset.re.is_finite() && offset.im.is_finite()) {
            return Err(CoreError::DegenerateViewport {
                reason: format!("offset must be finite, got {offset}"),
            });
        }
        Ok(Self {
            width,
            height,
            x_range,
            y_range,
            zoom,
            offset,
        })
    }

    /// The viewport described by a render config's allocation dimensions.
    pub fn from_config(config: &RenderConfig) -> crate::Result<Self> {
        Self::new(
            config.width,
            config.height,
            config.x_range,
            config.y_range,
            config.zoom,
            Complex::new(config.offset_x, config.offset_y),
        )
    }

    /// Map a pixel to its point `c = (x0, y0)` on the complex plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> Complex {
        Complex::new(
            map_to_plane(px as f64, self.width as f64, self.x_range) / self.zoom - self.offset.re,
            map_to_plane(py as f64, self.height as f64, self.y_range) / self.zoom - self.offset.im,
        )
    }
}
