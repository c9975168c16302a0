//! Fuzz target: `DrainModel::drained_volume`
//!
//! Arbitrary geometry, start volume and elapsed time.  The drained
//! volume must never be negative, NaN, or more than the vessel held.
//!
//! cargo fuzz run fuzz_drain_model

#![no_main]

use brewery::flow::DrainModel;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (f64, f64, f64, f64, f64)| {
    let (radius, valve, cd, start_ml, secs) = input;
    let model = DrainModel::new(radius, valve, cd);
    let drained = model.drained_volume(start_ml, secs);

    assert!(!drained.is_nan(), "NaN drained volume");
    assert!(drained >= 0.0, "negative drained volume {drained}");
    if start_ml.is_finite() {
        assert!(drained <= start_ml.max(0.0) * (1.0 + 1e-12), "drained more than held");
    }
});
