#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Symmetry icon renderer
//!
//! A symmetry icon is the attractor of a polynomial map of the complex
//! plane that commutes with rotation by 2π/n.  Iterating the map from
//! almost any seed traces out a figure with exact n-fold symmetry;
//! after millions of iterations the orbit has visited some pixels far
//! more often than others, and mapping those visitation counts through
//! a color gradient produces the image.
//!
//! The pieces, leaves first:
//!
//! - `SymmetricMap` advances the orbit one step.
//! - `Palette` stretches a few gradient anchors into a color ramp.
//! - `HistogramCanvas` counts visits per pixel and paints the counts
//!   onto a `Framebuffer`.
//! - `RenderLoop` owns all of the above for a single run and advances
//!   it a batch of iterations per `tick()`.
//!
//! `DatasetCatalog` reads named parameter sets from JSON.

extern crate itertools;
extern crate num;

pub mod canvas;
pub mod dataset;
pub mod errors;
pub mod map;
pub mod palette;
pub mod planes;
pub mod render;

pub use canvas::{Framebuffer, HistogramCanvas, RgbBuffer};
pub use dataset::{Dataset, DatasetCatalog};
pub use errors::{ConfigurationError, DatasetError};
pub use map::{MapParameters, SymmetricMap};
pub use palette::{ControlPoint, Palette, Rgb};
pub use render::{RenderLoop, RunConfig, RunState};
