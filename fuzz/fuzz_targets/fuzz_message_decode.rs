//! Fuzz target: inbound message parsing and `Event::decode`
//!
//! Feeds arbitrary bytes through the transport JSON parser and, when
//! they parse, through the event decoder.  Neither may panic, and a
//! decoded valve event must come from one of the known senders.
//!
//! cargo fuzz run fuzz_message_decode

#![no_main]

use brewery::app::events::{BOIL_VALVE, COLLECTION_PUMP, Event, MASH_VALVE, SOURCE_VALVE};
use brewery::app::message::Message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(msg) = serde_json::from_slice::<Message>(data) else {
        return;
    };
    match Event::decode(&msg) {
        Ok(Event::ReportVolumes) | Err(_) => {}
        Ok(_) => assert!(
            [SOURCE_VALVE, MASH_VALVE, BOIL_VALVE, COLLECTION_PUMP].contains(&msg.sender.as_str()),
            "decoded event from unknown sender {:?}",
            msg.sender
        ),
    }
});
