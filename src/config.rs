//! Brewing rig configuration
//!
//! Construction-time parameters for one brew session.  Geometry is in
//! centimetres, the source capacity in gallons (the display unit).
//! Values are immutable once the ledger is built.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::app::events::Vessel;
use crate::error::ConfigError;

/// Rig configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreweryConfig {
    // --- Source vessel ---
    /// Volume reported when the float switch trips (gallons)
    pub source_capacity_gallons: f64,
    /// Internal radius of the source vessel (cm)
    pub source_radius_cm: f64,

    // --- Source → mash valve ---
    /// Orifice radius of the valve feeding the mash vessel (cm)
    pub valve_radius_cm: f64,
    /// Dimensionless discharge coefficient of that orifice
    pub discharge_coefficient: f64,

    // --- Mash → boil ---
    /// Conservative time for the grain bed to drain completely (seconds)
    pub mash_drain_secs: u32,

    // --- Timing ---
    /// Source → mash sampling period (milliseconds)
    pub tick_interval_ms: u32,

    // --- Dispatch ---
    /// The one vessel adapter that forwards inbound events to the ledger
    pub master: Vessel,
}

impl Default for BreweryConfig {
    fn default() -> Self {
        Self {
            source_capacity_gallons: 7.0,
            source_radius_cm: 20.0,

            valve_radius_cm: 0.635, // 1/2" ball valve bore
            discharge_coefficient: 0.6,

            mash_drain_secs: 600, // 10 min

            tick_interval_ms: 1000, // 1 Hz

            master: Vessel::Source,
        }
    }
}

impl BreweryConfig {
    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.source_capacity_gallons.is_finite() && self.source_capacity_gallons > 0.0) {
            return Err(ConfigError::Invalid("source_capacity_gallons must be > 0"));
        }
        if !(self.source_radius_cm.is_finite() && self.source_radius_cm > 0.0) {
            return Err(ConfigError::Invalid("source_radius_cm must be > 0"));
        }
        if !(self.valve_radius_cm.is_finite() && self.valve_radius_cm > 0.0) {
            return Err(ConfigError::Invalid("valve_radius_cm must be > 0"));
        }
        if self.valve_radius_cm >= self.source_radius_cm {
            return Err(ConfigError::Invalid(
                "valve_radius_cm must be smaller than source_radius_cm",
            ));
        }
        if !(self.discharge_coefficient > 0.0 && self.discharge_coefficient <= 1.0) {
            return Err(ConfigError::Invalid("discharge_coefficient must be in (0, 1]"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Parse a JSON document and validate it.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read and validate a JSON configuration file.
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<BreweryConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading brewery config {}", path.display()))?;
    BreweryConfig::from_json(&raw)
        .with_context(|| format!("loading brewery config {}", path.display()))
}
