//! Mock message bus for integration tests.
//!
//! Wires a full [`Brewery`] to the deterministic doubles in
//! `brewery::sim` and a channel sink, so a test can publish valve events
//! and read back every volume report in emission order.

use std::sync::Arc;
use std::time::Duration;

use brewery::adapters::channel_sink::ChannelSink;
use brewery::app::ledger::LedgerPorts;
use brewery::sim::{GateTicker, ScriptedFloatSwitch, SteppedStopwatch};
use brewery::{Brewery, BreweryConfig, Message, Vessel};

/// Long enough for a transfer thread to react; short enough to fail fast.
pub const WAIT: Duration = Duration::from_secs(2);

/// Geometry the reference drain values were computed for.
pub fn test_config() -> BreweryConfig {
    BreweryConfig {
        source_capacity_gallons: 7.0,
        source_radius_cm: 10.0,
        valve_radius_cm: 0.25,
        discharge_coefficient: 0.4,
        ..BreweryConfig::default()
    }
}

pub struct MockBus {
    pub brewery: Brewery,
    pub ticker: Arc<GateTicker>,
    pub float_switch: Arc<ScriptedFloatSwitch>,
    pub outbox: Arc<ChannelSink>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::with_config(&test_config())
    }

    pub fn with_config(config: &BreweryConfig) -> Self {
        let ticker = Arc::new(GateTicker::new());
        let float_switch = Arc::new(ScriptedFloatSwitch::new());
        let outbox = Arc::new(ChannelSink::new());
        let ports = LedgerPorts {
            ticker: ticker.clone(),
            stopwatch: Arc::new(SteppedStopwatch::new(Duration::from_secs(1))),
            float_switch: float_switch.clone(),
        };
        let brewery = Brewery::new(config, ports, outbox.clone()).unwrap();
        brewery.start();
        // discard the four initial zero reports
        for _ in 0..4 {
            outbox.next_within(WAIT).unwrap();
        }
        Self {
            brewery,
            ticker,
            float_switch,
            outbox,
        }
    }

    pub fn switch(&self, sender: &str, on: bool) {
        self.brewery.dispatch(&Message::switch(sender, on));
    }

    pub fn report(&self) {
        self.brewery.dispatch(&Message::report());
    }

    /// Next outbound report as `(sender, gallons)`; panics on timeout.
    pub fn next(&self) -> (String, f64) {
        let msg = self
            .outbox
            .next_within(WAIT)
            .expect("timed out waiting for a volume report");
        let gallons = msg
            .value
            .as_ref()
            .and_then(|v| v.as_f64())
            .expect("volume report without a quantity");
        (msg.sender, gallons)
    }

    /// Next report must come from `vessel`; returns its volume.
    pub fn expect(&self, vessel: Vessel) -> f64 {
        let (sender, gallons) = self.next();
        assert_eq!(sender, vessel.uid(), "unexpected report order");
        gallons
    }

    pub fn assert_quiet(&self) {
        if let Some(msg) = self.outbox.next_within(Duration::from_millis(50)) {
            panic!("unexpected report: {msg:?}");
        }
    }

    /// Put `gallons` in `vessel` and swallow the resulting report.
    pub fn preload(&self, vessel: Vessel, gallons: f64) {
        self.brewery.ledger().set_volume(vessel, gallons);
        self.expect(vessel);
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
