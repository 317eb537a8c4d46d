// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gradient palettes.  A handful of anchors on the unit interval are
//! stretched into a fixed-length color ramp that is indexed directly
//! by hit count.

use num::clamp;
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::errors::ConfigurationError;

/// An 8-bit RGB color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A gradient anchor.  Channels are on the 0-255 scale but kept as
/// floats so the interpolation doesn't round twice.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ControlPoint {
    /// Where on the unit interval this color sits.
    pub position: f64,
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl ControlPoint {
    /// Shorthand constructor.
    pub fn new(position: f64, r: f64, g: f64, b: f64) -> Self {
        ControlPoint { position, r, g, b }
    }
}

impl From<[f64; 4]> for ControlPoint {
    fn from(p: [f64; 4]) -> Self {
        ControlPoint::new(p[0], p[1], p[2], p[3])
    }
}

impl From<ControlPoint> for [f64; 4] {
    fn from(p: ControlPoint) -> Self {
        [p.position, p.r, p.g, p.b]
    }
}

/// Verifies that a sequence of anchors can be interpolated: at least
/// two, on the unit interval, strictly increasing.
pub fn validate(points: &[ControlPoint]) -> Result<(), ConfigurationError> {
    if points.len() < 2 {
        return Err(ConfigurationError::TooFewControlPoints {
            count: points.len(),
        });
    }
    for (index, point) in points.iter().enumerate() {
        if !(point.position >= 0.0 && point.position <= 1.0) {
            return Err(ConfigurationError::ControlPointOutOfRange {
                index,
                position: point.position,
            });
        }
        if index > 0 && point.position <= points[index - 1].position {
            return Err(ConfigurationError::UnorderedControlPoints { index });
        }
    }
    Ok(())
}

fn channel(base: f64, top: f64, t: f64) -> u8 {
    clamp(base + t * (top - base), 0.0, 255.0) as u8
}

/// A precomputed color ramp.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Samples the gradient at `maxval` equally spaced positions
    /// `i / maxval` in a single forward sweep.  Samples before the
    /// first anchor or after the last take that anchor's color.
    pub fn build(points: &[ControlPoint], maxval: usize) -> Result<Palette, ConfigurationError> {
        validate(points)?;

        let last = points.len() - 2;
        let mut k = 0;
        let mut colors = Vec::with_capacity(maxval);
        for i in 0..maxval {
            let pos = i as f64 / maxval as f64;
            while k < last && pos > points[k + 1].position {
                k += 1;
            }
            let (lo, hi) = (&points[k], &points[k + 1]);
            let t = clamp(
                (pos - lo.position) / (hi.position - lo.position),
                0.0,
                1.0,
            );
            colors.push(Rgb(
                channel(lo.r, hi.r, t),
                channel(lo.g, hi.g, t),
                channel(lo.b, hi.b, t),
            ));
        }
        Ok(Palette { colors })
    }

    /// Number of colors in the ramp.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True if the ramp has no colors at all.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color for a hit count, saturating at the last color.
    pub fn color(&self, count: u32) -> Rgb {
        let top = self.colors.len().saturating_sub(1);
        self.colors[std::cmp::min(count as usize, top)]
    }
}

impl Index<usize> for Palette {
    type Output = Rgb;

    fn index(&self, i: usize) -> &Rgb {
        &self.colors[i]
    }
}
