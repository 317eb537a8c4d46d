// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a square on the complex plane centered on the origin whose
//! sides are `extent` long.
//!
//! The mapping is turned a quarter: the imaginary axis runs left to
//! right across the raster and the real axis runs bottom to top, so
//! the icons come out in their customary orientation.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a point in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps points between the complex plane and the raster.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The right-lower hand corner of the integral cartesian plane.
    /// The left-upper is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The side of the square of the complex plane that is plotted.
    pub extent: f64,
}

impl PlaneMapper {
    /// Constructor.  Validation is the caller's job; see
    /// `HistogramCanvas::new`.
    pub fn new(width: usize, height: usize, extent: f64) -> PlaneMapper {
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            extent,
        }
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a complex number, find the pixel it lands on.  Anything
    /// outside the raster, including infinities and NaNs, lands
    /// nowhere.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let width = self.integral_plane.0 as f64;
        let height = self.integral_plane.1 as f64;
        let left = (point.im / self.extent + 0.5) * width;
        let top = (-point.re / self.extent + 0.5) * height;
        if left >= 0.0 && left < width && top >= 0.0 && top < height {
            Some(Pixel(left as usize, top as usize))
        } else {
            None
        }
    }

    /// The linear offset of the pixel a point lands on, in row-major
    /// order.
    pub fn point_to_offset(&self, point: &Complex<f64>) -> Option<usize> {
        self.point_to_pixel(point)
            .map(|Pixel(left, top)| top * self.integral_plane.0 + left)
    }
}
