//! End-to-end brew-day scenarios, driven over the message interface.

use brewery::Vessel;
use brewery::app::events::{BOIL_VALVE, COLLECTION_PUMP, MASH_VALVE, SOURCE_VALVE};
use brewery::error::SensorError;

use crate::mock_bus::{MockBus, assert_close};

/// Drained gallons after 1, 2 and 3 simulated seconds for the test
/// geometry, starting from 7 gallons.
const DRAINED: [f64; 3] = [
    0.008_436_018_793_712_466,
    0.016_866_951_206_827_928,
    0.025_292_797_239_346_4,
];

#[test]
fn float_switch_fills_source() {
    let bus = MockBus::new();
    bus.switch(SOURCE_VALVE, true);
    bus.float_switch.trip();
    assert_close(bus.expect(Vessel::Source), 7.0);
}

#[test]
fn float_switch_error_is_not_fatal() {
    let bus = MockBus::new();
    bus.switch(SOURCE_VALVE, true);
    bus.float_switch.push(Err(SensorError::Disconnected));
    bus.assert_quiet();

    bus.report();
    for vessel in Vessel::ALL {
        assert_eq!(bus.expect(vessel), 0.0);
    }
}

#[test]
fn source_to_mash_conserves_volume() {
    let bus = MockBus::new();
    bus.preload(Vessel::Source, 7.0);

    bus.switch(MASH_VALVE, true);
    let mut last_mash = 0.0;
    let mut last_source = 7.0;
    for drained in &DRAINED[..2] {
        bus.ticker.fire();
        let source = bus.expect(Vessel::Source);
        let mash = bus.expect(Vessel::Mash);
        assert_close(mash, *drained);
        assert!(mash > last_mash && source < last_source);
        assert_close(source + mash, 7.0);
        last_mash = mash;
        last_source = source;
    }

    bus.switch(MASH_VALVE, false);
    let source = bus.expect(Vessel::Source);
    let mash = bus.expect(Vessel::Mash);
    assert_close(mash, DRAINED[2]);
    assert_close(source + mash, 7.0);
    bus.assert_quiet();
}

#[test]
fn close_before_first_tick_reports_elapsed_time() {
    let bus = MockBus::new();
    bus.preload(Vessel::Source, 7.0);

    bus.switch(MASH_VALVE, true);
    bus.switch(MASH_VALVE, false);
    let source = bus.expect(Vessel::Source);
    let mash = bus.expect(Vessel::Mash);
    assert!(mash > 0.0);
    assert_close(mash, DRAINED[0]);
    assert_close(source + mash, 7.0);
    bus.assert_quiet();
}

#[test]
fn mash_drains_to_boil_after_fixed_wait() {
    let bus = MockBus::new();
    bus.preload(Vessel::Mash, 5.25);

    bus.switch(BOIL_VALVE, true);
    bus.ticker.fire();
    assert_eq!(bus.expect(Vessel::Mash), 0.0);
    assert_close(bus.expect(Vessel::Boil), 5.25);
    assert!(!bus.brewery.ledger().boil_fill_running());
}

#[test]
fn drained_mash_replaces_stale_boil_reading() {
    let bus = MockBus::new();
    bus.preload(Vessel::Mash, 4.0);
    bus.preload(Vessel::Boil, 2.0);

    bus.switch(BOIL_VALVE, true);
    bus.ticker.fire();
    assert_eq!(bus.expect(Vessel::Mash), 0.0);
    assert_close(bus.expect(Vessel::Boil), 4.0);
}

#[test]
fn early_boil_valve_close_moves_nothing() {
    let bus = MockBus::new();
    bus.preload(Vessel::Mash, 5.25);

    bus.switch(BOIL_VALVE, true);
    bus.switch(BOIL_VALVE, false);
    bus.assert_quiet();

    let ledger = bus.brewery.ledger();
    assert_close(ledger.volume(Vessel::Mash), 5.25);
    assert_eq!(ledger.volume(Vessel::Boil), 0.0);

    // A tick arriving after the close has nothing left to release.
    bus.ticker.fire();
    bus.assert_quiet();
}

#[test]
fn pump_off_empties_boil_into_collection() {
    let bus = MockBus::new();
    bus.preload(Vessel::Boil, 4.75);

    bus.switch(COLLECTION_PUMP, true);
    bus.assert_quiet();
    bus.switch(COLLECTION_PUMP, false);
    assert_eq!(bus.expect(Vessel::Boil), 0.0);
    assert_close(bus.expect(Vessel::Collection), 4.75);
}

#[test]
fn full_brew_day() {
    let bus = MockBus::new();

    bus.switch(SOURCE_VALVE, true);
    bus.float_switch.trip();
    assert_close(bus.expect(Vessel::Source), 7.0);
    bus.switch(SOURCE_VALVE, false);

    bus.switch(MASH_VALVE, true);
    bus.ticker.fire();
    bus.expect(Vessel::Source);
    bus.expect(Vessel::Mash);
    bus.switch(MASH_VALVE, false);
    let source = bus.expect(Vessel::Source);
    let mash = bus.expect(Vessel::Mash);
    assert_close(mash, DRAINED[1]);

    bus.switch(BOIL_VALVE, true);
    bus.ticker.fire();
    assert_eq!(bus.expect(Vessel::Mash), 0.0);
    assert_close(bus.expect(Vessel::Boil), mash);

    bus.switch(COLLECTION_PUMP, false);
    assert_eq!(bus.expect(Vessel::Boil), 0.0);
    assert_close(bus.expect(Vessel::Collection), mash);

    let ledger = bus.brewery.ledger();
    let total: f64 = ledger.volumes().iter().map(|(_, g)| g).sum();
    assert_close(total, 7.0);
    assert_close(ledger.volume(Vessel::Source), source);
}
