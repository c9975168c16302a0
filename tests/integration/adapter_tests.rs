//! Adapter-level behaviour: master forwarding, report command, JSON.

use brewery::Vessel;
use brewery::app::events::{COLLECTION_PUMP, MASH_VALVE};
use brewery::app::message::{Message, Value};

use crate::mock_bus::{MockBus, assert_close, test_config};

#[test]
fn report_twice_is_idempotent() {
    let bus = MockBus::new();
    bus.preload(Vessel::Mash, 2.5);

    bus.report();
    let first: Vec<_> = (0..4).map(|_| bus.next()).collect();
    bus.report();
    let second: Vec<_> = (0..4).map(|_| bus.next()).collect();
    assert_eq!(first, second);
    assert_eq!(first[1].0, "mash volume");
    assert_close(first[1].1, 2.5);
    bus.assert_quiet();
}

#[test]
fn event_applied_once_whatever_the_master() {
    for master in Vessel::ALL {
        let config = brewery::BreweryConfig {
            master,
            ..test_config()
        };
        let bus = MockBus::with_config(&config);
        bus.preload(Vessel::Boil, 3.0);
        bus.preload(Vessel::Collection, 1.0);

        bus.switch(COLLECTION_PUMP, false);
        assert_eq!(bus.expect(Vessel::Boil), 0.0);
        assert_close(bus.expect(Vessel::Collection), 3.0);
        bus.assert_quiet();
    }
}

#[test]
fn transport_json_drives_the_ledger() {
    let bus = MockBus::new();
    bus.preload(Vessel::Source, 7.0);

    let open = r#"{"Uuid":"a1","Sender":"mash valve","Type":"update",
                   "Value":{"value":true},"TargetValue":{"value":1.0,"units":"gallons"}}"#;
    let close = r#"{"Sender":"mash valve","Type":"update","Value":{"value":false}}"#;
    assert!(bus.brewery.dispatch_json(open));
    assert!(bus.brewery.ledger().mash_fill_running());
    assert!(bus.brewery.dispatch_json(close));

    let source = bus.expect(Vessel::Source);
    let mash = bus.expect(Vessel::Mash);
    assert_close(source + mash, 7.0);
}

#[test]
fn outbound_reports_serialize_for_transport() {
    let bus = MockBus::new();
    bus.preload(Vessel::Boil, 2.0);
    bus.brewery.dispatch(&Message::report());
    let boil = bus
        .outbox
        .drain()
        .into_iter()
        .find(|m| m.sender == "boil volume")
        .unwrap();
    let json = serde_json::to_string(&boil).unwrap();
    assert_eq!(
        json,
        r#"{"Sender":"boil volume","Type":"update","Value":{"value":2.0,"units":"gallons"}}"#
    );
}

#[test]
fn unrelated_traffic_is_ignored() {
    let bus = MockBus::new();
    bus.brewery.dispatch(&Message::update(
        "boil temperature",
        Value::Quantity {
            value: 99.0,
            units: "C".into(),
        },
    ));
    bus.brewery.dispatch(&Message::command("reboot"));
    bus.brewery.dispatch(&Message::update(MASH_VALVE, Value::gallons(2.0)));
    assert!(!bus.brewery.dispatch_json("[]"));
    bus.assert_quiet();
    assert!(!bus.brewery.ledger().mash_fill_running());
}
