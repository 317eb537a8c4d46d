// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  A `ConfigurationError` means a run was refused before
//! it began; a `DatasetError` means the named parameter set could not
//! be produced at all.

use failure::Fail;

/// Raised synchronously when the parameters of a run cannot produce a
/// meaningful render.  A run that fails validation never starts.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A gradient needs at least two anchors to interpolate between.
    #[fail(display = "a palette needs at least 2 control points, got {}", count)]
    TooFewControlPoints {
        /// How many control points were supplied.
        count: usize,
    },

    /// Control point positions must be strictly increasing.
    #[fail(
        display = "palette control point {} is not after the one before it",
        index
    )]
    UnorderedControlPoints {
        /// Index of the first offending control point.
        index: usize,
    },

    /// Control point positions live on the unit interval.
    #[fail(
        display = "palette control point {} has position {}, outside [0, 1]",
        index, position
    )]
    ControlPointOutOfRange {
        /// Index of the offending control point.
        index: usize,
        /// The position it was given.
        position: f64,
    },

    /// The map only has dihedral symmetry for n of three or more.
    #[fail(display = "symmetry order must be at least 3, got {}", n)]
    SymmetryOrder {
        /// The requested order.
        n: u32,
    },

    /// The δ term's rotation order n·p must fit the iteration counter.
    #[fail(display = "rotation order {}·{} is too large", n, p)]
    RotationOrder {
        /// The symmetry order.
        n: u32,
        /// The secondary rotation multiplier.
        p: u32,
    },

    /// The raster has no pixels to draw on.
    #[fail(display = "raster must be non-empty, got {}x{}", width, height)]
    RasterSize {
        /// Raster width in pixels.
        width: usize,
        /// Raster height in pixels.
        height: usize,
    },

    /// The plotted region must have a finite, positive size.
    #[fail(display = "extent must be finite and positive, got {}", extent)]
    Extent {
        /// The requested extent.
        extent: f64,
    },

    /// The saturation cap must allow at least one hit.
    #[fail(display = "max hit must be at least 1")]
    MaxHit,

    /// Every tick must make progress.
    #[fail(display = "tick iterations must be at least 1")]
    TickIterations,
}

/// Raised when a named dataset cannot be loaded from a catalog.
#[derive(Debug, Fail)]
pub enum DatasetError {
    /// The catalog file could not be read.
    #[fail(display = "could not read dataset catalog: {}", _0)]
    Io(#[cause] std::io::Error),

    /// The catalog is not valid JSON or does not match the dataset
    /// layout.
    #[fail(display = "could not parse dataset catalog: {}", _0)]
    Parse(#[cause] serde_json::Error),

    /// The catalog has no dataset by that name.
    #[fail(display = "unknown dataset '{}'", name)]
    UnknownDataset {
        /// The name that was asked for.
        name: String,
    },
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Parse(err)
    }
}
