// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The hit histogram and the surfaces it is painted onto.
//!
//! Every point of an orbit that lands on the raster bumps a counter
//! for its pixel.  Counters saturate at the run's `max_hit` rather
//! than wrapping, so the densest parts of an attractor stay at the
//! top of the palette.  Colorizing reads each counter through the
//! palette and writes the result to a `Framebuffer`.

use itertools::iproduct;
use num::Complex;

use crate::errors::ConfigurationError;
use crate::palette::{Palette, Rgb};
use crate::planes::{Pixel, PlaneMapper};

/// The color everything is reset to at the start of a run.
pub const BACKGROUND: Rgb = Rgb(0, 0, 0);

/// Anything we can paint pixels onto.  The host owns the surface; the
/// histogram only ever writes to it.
pub trait Framebuffer {
    /// Width in pixels.
    fn width(&self) -> usize;

    /// Height in pixels.
    fn height(&self) -> usize;

    /// Set one pixel.  Coordinates are always inside the surface.
    fn write(&mut self, x: usize, y: usize, color: Rgb);

    /// Paint the whole surface one color.
    fn fill(&mut self, color: Rgb) {
        for (y, x) in iproduct!(0..self.height(), 0..self.width()) {
            self.write(x, y, color);
        }
    }

    /// Called once a frame is complete and may be shown.
    fn present(&mut self) {}
}

/// A plain in-memory RGB8 raster, three bytes per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbBuffer {
    /// A black raster.
    pub fn new(width: usize, height: usize) -> RgbBuffer {
        RgbBuffer {
            width,
            height,
            data: vec![0 as u8; width * height * 3],
        }
    }

    /// The color at a pixel.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        Rgb(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// The raw bytes, suitable for handing to an image encoder.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Framebuffer for RgbBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write(&mut self, x: usize, y: usize, color: Rgb) {
        let i = (y * self.width + x) * 3;
        self.data[i] = color.0;
        self.data[i + 1] = color.1;
        self.data[i + 2] = color.2;
    }

    fn fill(&mut self, color: Rgb) {
        for pixel in self.data.chunks_mut(3) {
            pixel[0] = color.0;
            pixel[1] = color.1;
            pixel[2] = color.2;
        }
    }
}

/// A grid of saturating hit counters covering a square of the complex
/// plane.
#[derive(Debug, Clone)]
pub struct HistogramCanvas {
    plane: PlaneMapper,
    counts: Vec<u32>,
    max_hit: u32,
}

impl HistogramCanvas {
    /// A zeroed histogram for a `width` by `height` raster that plots
    /// the square of side `extent` centered on the origin.  Counters
    /// stop at `max_hit`.
    pub fn new(
        width: usize,
        height: usize,
        extent: f64,
        max_hit: u32,
    ) -> Result<HistogramCanvas, ConfigurationError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::RasterSize { width, height });
        }
        if !(extent.is_finite() && extent > 0.0) {
            return Err(ConfigurationError::Extent { extent });
        }
        if max_hit == 0 {
            return Err(ConfigurationError::MaxHit);
        }
        let plane = PlaneMapper::new(width, height, extent);
        Ok(HistogramCanvas {
            counts: vec![0 as u32; plane.len()],
            plane,
            max_hit,
        })
    }

    /// Record a visit to the point `x + iy`, returning the cell's new
    /// count.  Points off the raster are dropped and return 0; a
    /// saturated cell stays at `max_hit`.
    pub fn increment(&mut self, x: f64, y: f64) -> u32 {
        match self.plane.point_to_offset(&Complex::new(x, y)) {
            Some(offset) => {
                let count = &mut self.counts[offset];
                if *count < self.max_hit {
                    *count += 1;
                }
                *count
            }
            None => 0,
        }
    }

    /// Paint every cell through the palette.  The framebuffer must be
    /// the size of the histogram.
    pub fn colorize<F: Framebuffer + ?Sized>(&self, palette: &Palette, framebuffer: &mut F) {
        let width = self.plane.integral_plane.0;
        debug_assert_eq!(framebuffer.width(), width);
        debug_assert_eq!(framebuffer.height(), self.plane.integral_plane.1);
        for (offset, count) in self.counts.iter().enumerate() {
            framebuffer.write(offset % width, offset / width, palette.color(*count));
        }
    }

    /// Zero every counter and blank the framebuffer.
    pub fn clear<F: Framebuffer + ?Sized>(&mut self, framebuffer: &mut F) {
        for count in self.counts.iter_mut() {
            *count = 0;
        }
        framebuffer.fill(BACKGROUND);
    }

    /// The count at a pixel.
    pub fn count(&self, pixel: Pixel) -> u32 {
        self.counts[pixel.1 * self.plane.integral_plane.0 + pixel.0]
    }

    /// Every counter, row-major.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// How many cells have been visited at least once.
    pub fn hits(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
}
