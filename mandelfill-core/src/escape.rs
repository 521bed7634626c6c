use crate::complex::Complex;
use crate::config::RenderConfig;

/// Iteration limits shared by every pixel of one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeParams {
    /// Escape radius squared: the orbit escapes once `x² + y²` exceeds it.
    pub threshold: f64,
    pub max_iterations: u32,
    /// Use the continuous escape count instead of the integer one.
    pub smooth: bool,
}

impl EscapeParams {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            threshold: config.threshold,
            max_iterations: config.max_iterations,
            smooth: config.smooth,
        }
    }
}

/// Per-pixel state left behind by one run of the escape loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalSample {
    pub c: Complex,
    /// Final `x` and `y` of the orbit.
    pub z: Complex,
    pub iterations: u32,
    /// `x² + y²` at loop exit.
    pub norm_sq: f64,
    pub escape_count: f64,
    /// `escape_count / max_iterations`, clamped to `[0, 1]`.
    pub stability: f64,
}

impl FractalSample {
    /// Run the quadratic recurrence for `c` and derive the escape count and
    /// stability from where the orbit ended up.
    pub fn compute(c: Complex, params: &EscapeParams) -> Self {
        let (mut x, mut y) = (0.0f64, 0.0f64);
        let (mut x2, mut y2) = (0.0f64, 0.0f64);
        let mut i = 0u32;

        // x² and y² are reused for both the bailout test and the next step.
        while x2 + y2 <= params.threshold && i < params.max_iterations {
            y = 2.0 * x * y + c.im;
            x = x2 - y2 + c.re;
            x2 = x * x;
            y2 = y * y;
            i += 1;
        }

        let norm_sq = x2 + y2;
        let escape_count = if params.smooth {
            smooth_count(i, norm_sq, params.threshold)
        } else {
            i as f64
        };

        Self {
            c,
            z: Complex::new(x, y),
            iterations: i,
            norm_sq,
            escape_count,
            stability: stability(escape_count, params.max_iterations),
        }
    }

    /// `1 - stability`.
    #[inline]
    pub fn instability(&self) -> f64 {
        1.0 - self.stability
    }
}

/// Continuous escape count `ν = n + 1 − ln(ln|z|) / ln 2`.
///
/// The double logarithm only has a real value once `|z| > 1`, and only
/// means anything once the orbit actually crossed the threshold. Anything
/// else falls back to the integer count so NaN never reaches the colors.
pub fn smooth_count(iterations: u32, norm_sq: f64, threshold: f64) -> f64 {
    if norm_sq <= threshold || norm_sq <= 1.0 {
        return iterations as f64;
    }
    let log_zn = norm_sq.sqrt().ln();
    iterations as f64 + 1.0 - log_zn.ln() / std::f64::consts::LN_2
}

/// Normalize an escape count into `[0, 1]`. `1` means the point never
/// escaped within the iteration budget.
#[inline]
pub fn stability(escape_count: f64, max_iterations: u32) -> f64 {
    let s = escape_count / max_iterations as f64;
    if s.is_nan() {
        return 1.0;
    }
    s.clamp(0.0, 1.0)
}

/// The escape count of `(x0, y0)`; integer-valued unless `smooth` is set.
pub fn escape_count(x0: f64, y0: f64, threshold: f64, max_iterations: u32, smooth: bool) -> f64 {
    let params = EscapeParams {
        threshold,
        max_iterations,
        smooth,
    };
    FractalSample::compute(Complex::new(x0, y0), &params).escape_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for threshold in [4.0, 16.0, 1e6] {
            assert_eq!(escape_count(0.0, 0.0, threshold, 500, false), 500.0);
            assert_eq!(escape_count(0.0, 0.0, threshold, 500, true), 500.0);
        }
        let sample = FractalSample::compute(
            Complex::ZERO,
            &EscapeParams {
                threshold: 4.0,
                max_iterations: 64,
                smooth: false,
            },
        );
        assert_eq!(sample.stability, 1.0);
        assert_eq!(sample.instability(), 0.0);
    }

    #[test]
    fn two_escapes_after_second_step() {
        // z₁ = 2 gives |z|² = 4, which is not > 4, so one more step: z₂ = 6.
        assert_eq!(escape_count(2.0, 0.0, 4.0, 1000, false), 2.0);
        assert_eq!(escape_count(2.0, 0.0, 4.0, 1000, false), 2.0);
    }

    #[test]
    fn far_point_escapes_on_first_step() {
        assert_eq!(escape_count(10.0, 0.0, 4.0, 1000, false), 1.0);
    }

    #[test]
    fn minus_one_is_periodic_and_bounded() {
        // 0 → -1 → 0 → -1 … never escapes.
        assert_eq!(escape_count(-1.0, 0.0, 4.0, 200, false), 200.0);
    }

    #[test]
    fn smoothing_matches_the_continuous_formula() {
        // (2, 0) escapes after 2 steps with z = 6.
        let expected = 3.0 - 6f64.ln().ln() / std::f64::consts::LN_2;
        assert_eq!(escape_count(2.0, 0.0, 4.0, 1000, true), expected);
        assert!((expected - 2.1586).abs() < 1e-4);
    }

    #[test]
    fn smoothing_is_continuous_near_integer_count() {
        // Just outside the set: escapes after a handful of steps.
        let raw = escape_count(0.3, 0.6, 4.0, 1000, false);
        let smooth = escape_count(0.3, 0.6, 4.0, 1000, true);
        assert_eq!(raw, 15.0);
        assert!(
            smooth > raw && smooth < raw + 1.0,
            "raw {raw}, smooth {smooth}"
        );
        assert!((smooth - 15.6757).abs() < 1e-3, "smooth {smooth}");
    }

    #[test]
    fn smoothing_leaves_interior_points_alone() {
        assert_eq!(escape_count(0.3, 0.5, 4.0, 1000, true), 1000.0);
    }

    #[test]
    fn smoothing_falls_back_when_point_did_not_escape() {
        // |z|² below 1: the double log would be NaN.
        assert_eq!(smooth_count(7, 0.5, 4.0), 7.0);
        // Escaped past a tiny threshold but still inside the unit circle.
        assert_eq!(smooth_count(3, 0.9, 0.25), 3.0);
        // Between 1 and the threshold: ran out of iterations.
        assert_eq!(smooth_count(100, 2.0, 4.0), 100.0);
    }

    #[test]
    fn smoothing_with_threshold_below_one_stays_finite() {
        for (x0, y0) in [(0.1, 0.1), (0.4, 0.0), (-0.2, 0.3)] {
            let v = escape_count(x0, y0, 0.5, 100, true);
            assert!(v.is_finite(), "({x0}, {y0}) gave {v}");
        }
    }

    #[test]
    fn stability_is_clamped() {
        assert_eq!(stability(-3.0, 100), 0.0);
        assert_eq!(stability(50.0, 100), 0.5);
        assert_eq!(stability(130.0, 100), 1.0);
        assert_eq!(stability(f64::NAN, 100), 1.0);
    }

    #[test]
    fn sample_records_final_orbit() {
        let params = EscapeParams {
            threshold: 4.0,
            max_iterations: 1000,
            smooth: false,
        };
        let s = FractalSample::compute(Complex::new(2.0, 0.0), &params);
        assert_eq!(s.iterations, 2);
        assert_eq!(s.z, Complex::new(6.0, 0.0));
        assert_eq!(s.norm_sq, 36.0);
        assert!((s.stability - 0.002).abs() < 1e-12);
    }
}
