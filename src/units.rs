//! Volume units.
//!
//! The ledger keeps every vessel in millilitres so repeated drain
//! samples don't accumulate rounding error. Gallons only appear at the
//! adapter boundary, in outbound status messages and configuration.

/// Millilitres per US gallon.
pub const ML_PER_GALLON: f64 = 3785.41;

/// Unit label attached to every outbound volume report.
pub const DISPLAY_UNITS: &str = "gallons";

pub fn gallons_to_ml(gallons: f64) -> f64 {
    gallons * ML_PER_GALLON
}

pub fn ml_to_gallons(ml: f64) -> f64 {
    ml / ML_PER_GALLON
}
