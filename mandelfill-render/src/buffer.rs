use image::{Rgba, RgbaImage};

/// One RGBA sample.
pub type Rgba8 = [u8; 4];

/// Bytes per cell.
pub const CHANNELS: usize = 4;

/// A dense, row-major RGBA raster, `4 * width * height` bytes long.
///
/// Allocated fully transparent; every fill strategy writes each cell exactly
/// once with an opaque color, so a zero alpha after a fill means a cell was
/// skipped. Cells are handed out as disjoint `&mut` slices (per row, per cell
/// or per job), which is what lets many tasks write without a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat cell index of `(px, py)`: `py * width + px`.
    #[inline]
    pub fn index(&self, px: u32, py: u32) -> usize {
        py as usize * self.width as usize + px as usize
    }

    /// Inverse of [`index`](Self::index). `None` past the last cell, which
    /// includes every index of a zero-width grid.
    #[inline]
    pub fn coords(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.len() {
            return None;
        }
        let w = self.width as usize;
        Some(((index % w) as u32, (index / w) as u32))
    }

    pub fn pixel(&self, px: u32, py: u32) -> Rgba8 {
        let i = self.index(px, py) * CHANNELS;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Row `py` as `width * 4` bytes.
    pub fn row(&self, py: u32) -> &[u8] {
        let stride = self.stride();
        let start = py as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Disjoint mutable rows, top to bottom. Empty for a zero-width grid.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let stride = self.stride().max(CHANNELS);
        self.pixels.chunks_exact_mut(stride)
    }

    /// Disjoint mutable cells in index order.
    pub fn cells_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.pixels.chunks_exact_mut(CHANNELS)
    }

    /// True once every cell carries a non-zero alpha.
    pub fn is_fully_written(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).all(|px| px[3] != 0)
    }

    /// Copy into an `image` buffer for post-filters and encoders.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| Rgba(self.pixel(x, y)))
    }
}
