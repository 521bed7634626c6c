//! Cosmetic post-filters applied to a copy of a finished grid.

use image::imageops::colorops::{brighten_in_place, contrast_in_place};
use image::RgbaImage;

use crate::buffer::PixelGrid;

/// Contrast and brightness, both in percent.
///
/// `contrast` goes straight to `image`'s contrast filter; `brightness` is
/// turned into an additive channel offset of `brightness% × 255`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Adjustments {
    pub contrast: f32,
    pub brightness: f32,
}

impl Adjustments {
    pub const NONE: Self = Self {
        contrast: 0.0,
        brightness: 0.0,
    };

    pub fn new(contrast: f32, brightness: f32) -> Self {
        Self {
            contrast,
            brightness,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.contrast == 0.0 && self.brightness == 0.0
    }

    /// Filter `image` in place.
    pub fn apply_in_place(&self, image: &mut RgbaImage) {
        if self.contrast != 0.0 {
            contrast_in_place(image, self.contrast);
            // The contrast filter maps alpha too; the raster is always opaque.
            for pixel in image.pixels_mut() {
                pixel.0[3] = u8::MAX;
            }
        }
        let offset = (self.brightness * 255.0 / 100.0).round() as i32;
        if offset != 0 {
            brighten_in_place(image, offset);
        }
    }

    /// A filtered copy of `grid`; the grid itself is left untouched.
    pub fn apply(&self, grid: &PixelGrid) -> RgbaImage {
        let mut image = grid.to_rgba_image();
        self.apply_in_place(&mut image);
        image
    }
}
