// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named parameter sets, read from a JSON catalog keyed by name.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::errors::DatasetError;
use crate::map::MapParameters;
use crate::palette::ControlPoint;
use crate::render::RunConfig;

fn default_p() -> u32 {
    1
}

/// One icon: the map coefficients, how much of the plane to show, and
/// the gradient to color it with.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Dataset {
    /// See `MapParameters::lambda`.
    pub lambda: f64,
    /// See `MapParameters::alpha`.
    pub alpha: f64,
    /// See `MapParameters::beta`.
    pub beta: f64,
    /// See `MapParameters::gamma`.
    pub gamma: f64,
    /// See `MapParameters::delta`.
    #[serde(default)]
    pub delta: f64,
    /// See `MapParameters::omega`.
    #[serde(default)]
    pub omega: f64,
    /// Symmetry order.
    pub n: u32,
    /// See `MapParameters::p`.
    #[serde(default = "default_p")]
    pub p: u32,
    /// Side of the plotted square.
    pub extent: f64,
    /// Gradient anchors, each `[position, r, g, b]`.
    pub palette: Vec<ControlPoint>,
}

impl Dataset {
    /// The map coefficients.
    pub fn parameters(&self) -> MapParameters {
        MapParameters {
            lambda: self.lambda,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            delta: self.delta,
            omega: self.omega,
            n: self.n,
            p: self.p,
        }
    }

    /// The gradient anchors.
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.palette
    }

    /// A run of this dataset with the default run settings.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.parameters(), self.extent, self.palette.clone())
    }
}

/// Datasets by name.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DatasetCatalog {
    datasets: BTreeMap<String, Dataset>,
}

impl DatasetCatalog {
    /// Read a catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DatasetCatalog, DatasetError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Look a dataset up by name.
    pub fn get(&self, name: &str) -> Result<&Dataset, DatasetError> {
        self.datasets
            .get(name)
            .ok_or_else(|| DatasetError::UnknownDataset {
                name: name.to_string(),
            })
    }

    /// Every dataset name, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.datasets.keys().map(|k| k.as_str()).collect()
    }

    /// Every dataset, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> + '_ {
        self.datasets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// True if there are no datasets.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl FromStr for DatasetCatalog {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<DatasetCatalog, DatasetError> {
        Ok(serde_json::from_str(s)?)
    }
}
