//! Stability → RGB through HSV.

/// Channels are rounded to this many decimal places before scaling to 8 bits.
const PRECISION: i32 = 2;

pub const BLACK: [u8; 3] = [0, 0, 0];

/// An HSV triple: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    /// The HSV color a stability value maps to.
    ///
    /// Hue sweeps the wheel with instability and is rotated by `hue_offset`;
    /// saturation is the instability and value the stability, so slow-escaping
    /// points are bright and washed out while fast ones are dark and vivid.
    pub fn from_stability(stability: f64, hue_offset: f64) -> Self {
        let instability = 1.0 - stability;
        Self {
            hue: wrap_degrees(instability * 360.0 + hue_offset),
            saturation: instability,
            value: stability,
        }
    }

    /// Convert to 8-bit RGB.
    ///
    /// Each channel is rounded to two places first, then scaled and
    /// truncated, in that order.
    pub fn to_rgb(self) -> [u8; 3] {
        let (r, g, b) = self.to_unit_rgb();
        [to_byte(r), to_byte(g), to_byte(b)]
    }

    fn to_unit_rgb(self) -> (f64, f64, f64) {
        let Hsv {
            hue,
            saturation,
            value,
        } = self;

        let (r, g, b) = if saturation == 0.0 {
            (value, value, value)
        } else {
            let chroma = value * saturation;
            // A non-finite hue takes the last sector at its 360° edge.
            let sector = if hue.is_finite() {
                wrap_degrees(hue) / 60.0
            } else {
                6.0
            };
            let x = chroma * (1.0 - ((sector % 2.0) - 1.0).abs());

            let (r, g, b) = match sector {
                s if (0.0..=1.0).contains(&s) => (chroma, x, 0.0),
                s if s > 1.0 && s <= 2.0 => (x, chroma, 0.0),
                s if s > 2.0 && s <= 3.0 => (0.0, chroma, x),
                s if s > 3.0 && s <= 4.0 => (0.0, x, chroma),
                s if s > 4.0 && s <= 5.0 => (x, 0.0, chroma),
                // (5, 6] and anything floating point pushes past it.
                _ => (chroma, 0.0, x),
            };

            let m = value - chroma;
            (r + m, g + m, b + m)
        };

        (
            round_places(r, PRECISION),
            round_places(g, PRECISION),
            round_places(b, PRECISION),
        )
    }
}

/// The color of a pixel with the given stability.
///
/// Both ends of the range are black: a stability of `1` is a point that
/// never escaped, and an instability of `1` is a point that escaped before
/// the first iteration counted.
pub fn color_for(stability: f64, hue_offset: f64) -> [u8; 3] {
    let instability = 1.0 - stability;
    if stability >= 1.0 || instability >= 1.0 {
        return BLACK;
    }
    Hsv::from_stability(stability, hue_offset).to_rgb()
}

/// HSV → 8-bit RGB.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    Hsv {
        hue,
        saturation,
        value,
    }
    .to_rgb()
}

/// True modulo: negative angles wrap into `[0, 360]`.
#[inline]
fn wrap_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

fn round_places(x: f64, places: i32) -> f64 {
    if places <= 0 {
        return x.round();
    }
    let multi = 10f64.powi(places.min(16));
    (x * multi).round() / multi
}

#[inline]
fn to_byte(unit: f64) -> u8 {
    (unit * 255.0) as u8
}
