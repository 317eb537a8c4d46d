// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The symmetric map.
//!
//! Field and Golubitsky's icons come from iterating a polynomial map
//! of the complex plane that commutes with rotation by 2π/n (and,
//! when ω is zero, with reflection across the real axis).  Whatever
//! point we feed it, the orbit of that point rotated by 2π/n is the
//! unrotated orbit turned by 2π/n, so the attractor it traces has
//! exact n-fold symmetry.
//!
//! With `r = |z|²` the map is
//!
//! ```text
//! z' = (λ + α·r + β·Re(zⁿ) + δ·Re((z/|z|)ⁿᵖ)·|z| + iω)·z + γ·conj(zⁿ⁻¹)
//! ```
//!
//! The δ term layers an independent n·p-fold rotational perturbation
//! on top of the basic map.

use num::Complex;

use crate::errors::ConfigurationError;

/// The coefficients of the map.  These never change for the lifetime
/// of a map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapParameters {
    /// Linear scale.
    pub lambda: f64,
    /// Weight of the squared magnitude.
    pub alpha: f64,
    /// Weight of Re(zⁿ).
    pub beta: f64,
    /// Weight of the conjugate power conj(zⁿ⁻¹).
    pub gamma: f64,
    /// Weight of the n·p-fold perturbation.
    pub delta: f64,
    /// Rotation applied every step.
    pub omega: f64,
    /// Symmetry order.
    pub n: u32,
    /// Secondary rotation multiplier for the δ term.
    pub p: u32,
}

impl MapParameters {
    /// Checks that the parameters describe a map with dihedral
    /// symmetry and a δ rotation order that fits in a `u32`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n < 3 {
            return Err(ConfigurationError::SymmetryOrder { n: self.n });
        }
        if self.n.checked_mul(self.p).is_none() {
            return Err(ConfigurationError::RotationOrder {
                n: self.n,
                p: self.p,
            });
        }
        Ok(())
    }
}

/// A single step of the symmetric map.
#[derive(Debug, Clone)]
pub struct SymmetricMap {
    params: MapParameters,
}

impl SymmetricMap {
    /// Builds the map, refusing parameter sets without the required
    /// symmetry order.
    pub fn new(params: MapParameters) -> Result<SymmetricMap, ConfigurationError> {
        params.validate()?;
        Ok(SymmetricMap { params })
    }

    /// Advance a point by one step.
    ///
    /// This is a pure function.  Points that have escaped to infinity
    /// come back as infinities or NaNs; it's up to the caller to drop
    /// them.
    pub fn iterate(&self, z: Complex<f64>) -> Complex<f64> {
        let params = &self.params;
        let r = z.norm_sqr();

        // zⁿ⁻¹ by repeated multiplication.
        let mut zn1 = z;
        for _ in 0..params.n - 2 {
            zn1 = zn1 * z;
        }
        let zn_re = (z * zn1).re;

        let extra = if params.delta != 0.0 {
            self.perturbation(z, r.sqrt())
        } else {
            0.0
        };

        let scale = params.lambda + params.alpha * r + params.beta * zn_re + params.delta * extra;
        Complex::new(
            scale * z.re + params.gamma * zn1.re - params.omega * z.im,
            scale * z.im - params.gamma * zn1.im + params.omega * z.re,
        )
    }

    // Re((z/|z|)^(n·p))·|z|.  The unit vector is undefined at the
    // origin, where the term is skipped.
    fn perturbation(&self, z: Complex<f64>, zabs: f64) -> f64 {
        if zabs == 0.0 {
            return 0.0;
        }
        let e = z / zabs;
        let mut acc = Complex::new(1.0, 0.0);
        for _ in 0..self.params.n * self.params.p {
            acc = e * acc;
        }
        acc.re * zabs
    }

    /// The orbit of `seed`, not including the seed itself.
    pub fn orbit(&self, seed: Complex<f64>) -> Orbit<'_> {
        Orbit { map: self, z: seed }
    }
}

/// An endless iterator over the successive points of an orbit.
pub struct Orbit<'a> {
    map: &'a SymmetricMap,
    z: Complex<f64>,
}

impl<'a> Iterator for Orbit<'a> {
    type Item = Complex<f64>;

    fn next(&mut self) -> Option<Complex<f64>> {
        self.z = self.map.iterate(self.z);
        Some(self.z)
    }
}
