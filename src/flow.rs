//! Orifice drain model.
//!
//! Liquid leaving the source vessel through the transfer valve is
//! modelled as gravity-driven outflow through a sharp-edged circular
//! orifice (Torricelli).  Integrating the outflow over the vessel's
//! cross-section gives a closed form for the level drop after `t`
//! seconds:
//!
//! ```text
//!   h0 = V0 / A
//!   Δh = | (t/k)² − 2·(t/k)·√h0 |
//!   drained = A · Δh
//!   k = A·√(2/g) / (a·Cd)
//! ```
//!
//! where `A` is the vessel cross-section, `a` the valve orifice area and
//! `Cd` the discharge coefficient.  Lengths are centimetres, so `A·Δh`
//! is cm³ which is already millilitres.
//!
//! Every function here is pure.  Callers always pass the *original*
//! start volume and the *total* elapsed time since the valve opened,
//! never deltas, so any sample can be recomputed independently.

use core::f64::consts::PI;

/// Standard gravity in cm/s².
pub const GRAVITY_CM_PER_S2: f64 = 980.6;

/// Geometry-derived drain constants for one source vessel and valve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrainModel {
    /// Source vessel cross-sectional area (cm²).
    area_cm2: f64,
    /// Valve orifice area (cm²).
    valve_area_cm2: f64,
    /// Time constant `k` (s/√cm).
    k: f64,
}

impl DrainModel {
    /// Derive the drain constants from vessel and valve radii (cm) and a
    /// dimensionless discharge coefficient.
    pub fn new(source_radius_cm: f64, valve_radius_cm: f64, discharge_coefficient: f64) -> Self {
        let area_cm2 = PI * source_radius_cm.powi(2);
        let valve_area_cm2 = PI * valve_radius_cm.powi(2);
        let k = (area_cm2 * gravity_factor()) / (valve_area_cm2 * discharge_coefficient);
        Self {
            area_cm2,
            valve_area_cm2,
            k,
        }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn area_cm2(&self) -> f64 {
        self.area_cm2
    }

    /// Volume (mL) that has left a vessel which held `start_ml` when the
    /// valve opened, `elapsed_secs` ago.
    ///
    /// Never negative and never more than `start_ml`.  Non-representable
    /// intermediate results (no recorded start volume, NaN) mean no flow.
    pub fn drained_volume(&self, start_ml: f64, elapsed_secs: f64) -> f64 {
        let height = start_ml / self.area_cm2;
        let usable = height.is_finite() && height > 0.0 && self.k.is_finite() && self.k > 0.0;
        if !usable || !(elapsed_secs > 0.0) {
            return 0.0;
        }

        let root = height.sqrt();
        let ratio = elapsed_secs / self.k;
        if ratio >= root {
            // Past the full-drain horizon: the vessel is empty.
            return start_ml;
        }

        let dh = (ratio.powi(2) - 2.0 * ratio * root).abs();
        if !dh.is_finite() {
            return 0.0;
        }
        (self.area_cm2 * dh).min(start_ml)
    }

    /// Seconds needed to drain `drained_ml` out of a vessel starting at
    /// `start_ml`.  `None` when asking for more than the vessel holds.
    pub fn drain_time(&self, start_ml: f64, drained_ml: f64) -> Option<f64> {
        let h0 = start_ml / self.area_cm2;
        let h1 = h0 - drained_ml / self.area_cm2;
        if !h0.is_finite() || !h1.is_finite() || drained_ml < 0.0 || h1 < 0.0 {
            return None;
        }
        Some((h0.sqrt() - h1.sqrt()) * self.k)
    }

    /// Calibration: the discharge coefficient that explains draining
    /// `drained_ml` out of `start_ml` in `elapsed_secs`.
    pub fn discharge_coefficient(
        &self,
        start_ml: f64,
        drained_ml: f64,
        elapsed_secs: f64,
    ) -> Option<f64> {
        let h0 = start_ml / self.area_cm2;
        let h1 = h0 - drained_ml / self.area_cm2;
        if !(elapsed_secs > 0.0) || h1 < 0.0 || !h0.is_finite() {
            return None;
        }
        let cd = (self.area_cm2 * gravity_factor() / self.valve_area_cm2)
            * (h0.sqrt() - h1.sqrt())
            / elapsed_secs;
        cd.is_finite().then_some(cd)
    }
}

fn gravity_factor() -> f64 {
    (2.0 / GRAVITY_CM_PER_S2).sqrt()
}
