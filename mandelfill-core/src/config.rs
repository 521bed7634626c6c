use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Plane range
// ---------------------------------------------------------------------------

/// One axis of the complex-plane rectangle mapped onto the raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRange {
    pub min: f64,
    pub max: f64,
}

impl PlaneRange {
    /// `[-1, 1]`, used for both axes by default.
    pub const SYMMETRIC: Self = Self {
        min: -1.0,
        max: 1.0,
    };

    /// `[-2.5, 1]`, the real-axis range that frames the whole set.
    pub const CLASSIC_X: Self = Self {
        min: -2.5,
        max: 1.0,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for PlaneRange {
    fn default() -> Self {
        Self::SYMMETRIC
    }
}

// ---------------------------------------------------------------------------
// Fill mode
// ---------------------------------------------------------------------------

/// Selects the strategy the fill scheduler uses to populate the grid.
///
/// Serialised as its short selector so config files and CLI flags share
/// the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillMode {
    #[default]
    #[serde(rename = "seq")]
    Sequential,
    #[serde(rename = "pixel")]
    PerPixel,
    #[serde(rename = "row")]
    PerRow,
    #[serde(rename = "workers")]
    WorkerPool,
}

impl FillMode {
    pub const ALL: [FillMode; 4] = [
        FillMode::Sequential,
        FillMode::PerPixel,
        FillMode::PerRow,
        FillMode::WorkerPool,
    ];

    /// The short selector accepted by [`FromStr`].
    pub fn selector(self) -> &'static str {
        match self {
            FillMode::Sequential => "seq",
            FillMode::PerPixel => "pixel",
            FillMode::PerRow => "row",
            FillMode::WorkerPool => "workers",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for FillMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FillMode::ALL
            .into_iter()
            .find(|mode| mode.selector() == s)
            .ok_or_else(|| CoreError::InvalidFillMode(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

/// A fully resolved render request.
///
/// `width` and `height` are the allocation dimensions, i.e. already
/// multiplied by `scale_factor`. They are shared by the viewport mapper and
/// the pixel grid and never change once the grid is allocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Escape radius squared.
    pub threshold: f64,
    pub max_iterations: u32,
    /// Thread count for [`FillMode::WorkerPool`]; ignored by the other modes.
    pub worker_count: usize,
    /// Bound of the worker-pool job queue. `0` is a rendezvous hand-off.
    pub queue_capacity: usize,
    pub scale_factor: u32,
    pub fill_mode: FillMode,
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Degrees; wrapped modulo 360 by the color mapper.
    pub hue_offset: f64,
    pub smooth: bool,
    pub x_range: PlaneRange,
    pub y_range: PlaneRange,
}

impl RenderConfig {
    pub const DEFAULT_WIDTH: u32 = 700;
    pub const DEFAULT_HEIGHT: u32 = 700;
    pub const DEFAULT_THRESHOLD: f64 = 4.0;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;
    pub const DEFAULT_WORKER_COUNT: usize = 4;

    /// Total number of cells in the grid this config allocates.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reject configurations the fill must never see.
    ///
    /// Degenerate viewports are checked here, before allocation, so a zero
    /// zoom or zero-width plane extent cannot leak NaN into the colors.
    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(CoreError::InvalidThreshold(self.threshold));
        }
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if self.worker_count == 0 {
            return Err(CoreError::InvalidWorkerCount(self.worker_count));
        }
        if self.scale_factor == 0 {
            return Err(CoreError::InvalidScaleFactor(self.scale_factor));
        }
        Viewport::from_config(self).map(|_| ())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            threshold: Self::DEFAULT_THRESHOLD,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            worker_count: Self::DEFAULT_WORKER_COUNT,
            queue_capacity: 0,
            scale_factor: 1,
            fill_mode: FillMode::Sequential,
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            hue_offset: 0.0,
            smooth: false,
            x_range: PlaneRange::SYMMETRIC,
            y_range: PlaneRange::SYMMETRIC,
        }
    }
}

// ---------------------------------------------------------------------------
// Partial config
// ---------------------------------------------------------------------------

/// A render request as supplied by a caller: every field optional.
///
/// The fill mode travels as its string selector so that an unknown value
/// is reported as [`CoreError::InvalidFillMode`] during resolution rather
/// than at parse time in some outer layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialRenderConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub threshold: Option<f64>,
    pub max_iterations: Option<u32>,
    pub worker_count: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub scale_factor: Option<u32>,
    pub fill_mode: Option<String>,
    pub zoom: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub hue_offset: Option<f64>,
    pub smooth: Option<bool>,
    pub x_range: Option<PlaneRange>,
    pub y_range: Option<PlaneRange>,
}

/// Zero counts as unset for the numeric fields that have a non-zero default.
fn nonzero_or<T: PartialEq + Default>(value: Option<T>, default: T) -> T {
    value.filter(|v| *v != T::default()).unwrap_or(default)
}

impl PartialRenderConfig {
    /// Merge `self` over `other`, field by field. `self` wins where set.
    pub fn or(self, other: PartialRenderConfig) -> PartialRenderConfig {
        PartialRenderConfig {
            width: self.width.or(other.width),
            height: self.height.or(other.height),
            threshold: self.threshold.or(other.threshold),
            max_iterations: self.max_iterations.or(other.max_iterations),
            worker_count: self.worker_count.or(other.worker_count),
            queue_capacity: self.queue_capacity.or(other.queue_capacity),
            scale_factor: self.scale_factor.or(other.scale_factor),
            fill_mode: self.fill_mode.or(other.fill_mode),
            zoom: self.zoom.or(other.zoom),
            offset_x: self.offset_x.or(other.offset_x),
            offset_y: self.offset_y.or(other.offset_y),
            hue_offset: self.hue_offset.or(other.hue_offset),
            smooth: self.smooth.or(other.smooth),
            x_range: self.x_range.or(other.x_range),
            y_range: self.y_range.or(other.y_range),
        }
    }

    /// Fill unset fields from `defaults`, apply the scale factor and
    /// validate the result.
    ///
    /// `defaults` is read as an unscaled base: its `width`/`height` are
    /// multiplied by the resolved scale factor like any other value.
    pub fn resolve(&self, defaults: &RenderConfig) -> crate::Result<RenderConfig> {
        let fill_mode = match self.fill_mode.as_deref() {
            None | Some("") => defaults.fill_mode,
            Some(selector) => selector.parse()?,
        };

        let scale_factor = nonzero_or(self.scale_factor, defaults.scale_factor.max(1));
        let base_width = nonzero_or(self.width, defaults.width);
        let base_height = nonzero_or(self.height, defaults.height);
        let (width, height) = match (
            base_width.checked_mul(scale_factor),
            base_height.checked_mul(scale_factor),
        ) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(CoreError::InvalidDimensions {
                    width: base_width,
                    height: base_height,
                })
            }
        };

        let config = RenderConfig {
            width,
            height,
            threshold: nonzero_or(self.threshold, defaults.threshold),
            max_iterations: nonzero_or(self.max_iterations, defaults.max_iterations),
            worker_count: nonzero_or(self.worker_count, defaults.worker_count),
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            scale_factor,
            fill_mode,
            zoom: nonzero_or(self.zoom, defaults.zoom),
            offset_x: self.offset_x.unwrap_or(defaults.offset_x),
            offset_y: self.offset_y.unwrap_or(defaults.offset_y),
            hue_offset: self.hue_offset.unwrap_or(defaults.hue_offset),
            smooth: self.smooth.unwrap_or(defaults.smooth),
            x_range: self.x_range.unwrap_or(defaults.x_range),
            y_range: self.y_range.unwrap_or(defaults.y_range),
        };
        config.validate()?;

        debug!(
            width = config.width,
            height = config.height,
            mode = %config.fill_mode,
            "Resolved render config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_mode_selectors_round_trip() {
        for mode in FillMode::ALL {
            assert_eq!(mode.selector().parse::<FillMode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_fill_mode_is_rejected() {
        let err = "threads".parse::<FillMode>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidFillMode(ref s) if s == "threads"));
    }

    #[test]
    fn fill_mode_serialises_as_selector() {
        let json = serde_json::to_string(&FillMode::WorkerPool).unwrap();
        assert_eq!(json, "\"workers\"");
    }

    #[test]
    fn empty_partial_resolves_to_defaults() {
        let cfg = PartialRenderConfig::default()
            .resolve(&RenderConfig::default())
            .unwrap();
        assert_eq!(cfg, RenderConfig::default());
    }

    #[test]
    fn zero_fields_take_defaults() {
        let partial = PartialRenderConfig {
            width: Some(0),
            threshold: Some(0.0),
            zoom: Some(0.0),
            scale_factor: Some(0),
            ..Default::default()
        };
        let cfg = partial.resolve(&RenderConfig::default()).unwrap();
        assert_eq!(cfg.width, RenderConfig::DEFAULT_WIDTH);
        assert_eq!(cfg.threshold, RenderConfig::DEFAULT_THRESHOLD);
        assert_eq!(cfg.zoom, 1.0);
        assert_eq!(cfg.scale_factor, 1);
    }

    #[test]
    fn set_fields_override_defaults() {
        let partial = PartialRenderConfig {
            width: Some(320),
            height: Some(200),
            max_iterations: Some(50),
            fill_mode: Some("row".into()),
            hue_offset: Some(-90.0),
            smooth: Some(true),
            ..Default::default()
        };
        let cfg = partial.resolve(&RenderConfig::default()).unwrap();
        assert_eq!((cfg.width, cfg.height), (320, 200));
        assert_eq!(cfg.max_iterations, 50);
        assert_eq!(cfg.fill_mode, FillMode::PerRow);
        assert_eq!(cfg.hue_offset, -90.0);
        assert!(cfg.smooth);
    }

    #[test]
    fn scale_factor_multiplies_dimensions() {
        let partial = PartialRenderConfig {
            width: Some(100),
            height: Some(60),
            scale_factor: Some(3),
            ..Default::default()
        };
        let cfg = partial.resolve(&RenderConfig::default()).unwrap();
        assert_eq!((cfg.width, cfg.height), (300, 180));
        assert_eq!(cfg.scale_factor, 3);
    }

    #[test]
    fn scale_overflow_is_rejected() {
        let partial = PartialRenderConfig {
            width: Some(u32::MAX / 2),
            scale_factor: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            partial.resolve(&RenderConfig::default()),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn bad_mode_fails_resolution() {
        let partial = PartialRenderConfig {
            fill_mode: Some("gpu".into()),
            ..Default::default()
        };
        assert!(matches!(
            partial.resolve(&RenderConfig::default()),
            Err(CoreError::InvalidFillMode(_))
        ));
    }

    #[test]
    fn negative_zoom_is_degenerate() {
        let partial = PartialRenderConfig {
            zoom: Some(-2.0),
            ..Default::default()
        };
        assert!(matches!(
            partial.resolve(&RenderConfig::default()),
            Err(CoreError::DegenerateViewport { .. })
        ));
    }

    #[test]
    fn collapsed_range_is_degenerate() {
        let partial = PartialRenderConfig {
            y_range: Some(PlaneRange::new(0.5, 0.5)),
            ..Default::default()
        };
        assert!(matches!(
            partial.resolve(&RenderConfig::default()),
            Err(CoreError::DegenerateViewport { .. })
        ));
    }

    #[test]
    fn validate_rejects_hand_built_configs() {
        let base = RenderConfig::default();
        let rejected = [
            RenderConfig {
                width: 0,
                ..base.clone()
            },
            RenderConfig {
                threshold: f64::NAN,
                ..base.clone()
            },
            RenderConfig {
                threshold: -4.0,
                ..base.clone()
            },
            RenderConfig {
                max_iterations: 0,
                ..base.clone()
            },
            RenderConfig {
                worker_count: 0,
                ..base.clone()
            },
            RenderConfig {
                zoom: 0.0,
                ..base.clone()
            },
        ];
        for config in &rejected {
            assert!(config.validate().is_err(), "{config:?}");
        }
        assert!(base.validate().is_ok());
    }

    #[test]
    fn layered_partials_prefer_the_left() {
        let flags = PartialRenderConfig {
            width: Some(64),
            ..Default::default()
        };
        let file = PartialRenderConfig {
            width: Some(128),
            height: Some(32),
            ..Default::default()
        };
        let merged = flags.or(file);
        assert_eq!(merged.width, Some(64));
        assert_eq!(merged.height, Some(32));
    }

    #[test]
    fn partial_deserialises_from_json() {
        let json = r#"{
            "width": 80,
            "fill_mode": "pixel",
            "x_range": { "min": -2.5, "max": 1.0 }
        }"#;
        let partial: PartialRenderConfig = serde_json::from_str(json).unwrap();
        let cfg = partial.resolve(&RenderConfig::default()).unwrap();
        assert_eq!(cfg.width, 80);
        assert_eq!(cfg.fill_mode, FillMode::PerPixel);
        assert_eq!(cfg.x_range, PlaneRange::CLASSIC_X);
    }

    #[test]
    fn partial_rejects_unknown_keys() {
        let json = r#"{ "colour": "red" }"#;
        assert!(serde_json::from_str::<PartialRenderConfig>(json).is_err());
    }
}
