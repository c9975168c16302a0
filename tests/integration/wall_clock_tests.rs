//! A short session on real time: reactor timers, a monotonic clock and
//! the GPIO float switch adapter on a shared test pin.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brewery::adapters::channel_sink::ChannelSink;
use brewery::adapters::float_switch::FloatSwitch;
use brewery::app::events::{BOIL_VALVE, MASH_VALVE, SOURCE_VALVE};
use brewery::{Brewery, BreweryConfig, Message, Vessel};
use embedded_hal::digital::{ErrorType, InputPin};

use crate::mock_bus::{WAIT, assert_close, test_config};

#[derive(Clone)]
struct SharedPin(Arc<AtomicBool>);

impl ErrorType for SharedPin {
    type Error = Infallible;
}

impl InputPin for SharedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.load(Ordering::Acquire))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.load(Ordering::Acquire))
    }
}

fn next(outbox: &ChannelSink, vessel: Vessel) -> f64 {
    let msg = outbox.next_within(WAIT).expect("timed out waiting for a report");
    assert_eq!(msg.sender, vessel.uid());
    msg.value.and_then(|v| v.as_f64()).unwrap()
}

#[test]
fn short_session_on_wall_clock() {
    let config = BreweryConfig {
        tick_interval_ms: 20,
        mash_drain_secs: 1,
        ..test_config()
    };
    let level = Arc::new(AtomicBool::new(false));
    let float_switch = FloatSwitch::with_poll(SharedPin(level.clone()), true, Duration::from_millis(5));
    let outbox = Arc::new(ChannelSink::new());
    let brewery = Brewery::with_wall_clock(&config, Arc::new(float_switch), outbox.clone()).unwrap();
    brewery.start();
    for vessel in Vessel::ALL {
        assert_eq!(next(&outbox, vessel), 0.0);
    }

    brewery.dispatch(&Message::switch(SOURCE_VALVE, true));
    level.store(true, Ordering::Release);
    assert_close(next(&outbox, Vessel::Source), 7.0);
    brewery.dispatch(&Message::switch(SOURCE_VALVE, false));

    brewery.dispatch(&Message::switch(MASH_VALVE, true));
    let mut last_mash = 0.0;
    for _ in 0..2 {
        let source = next(&outbox, Vessel::Source);
        let mash = next(&outbox, Vessel::Mash);
        assert!(mash > last_mash);
        assert_close(source + mash, 7.0);
        last_mash = mash;
    }
    brewery.dispatch(&Message::switch(MASH_VALVE, false));
    // Any samples already queued, then the final one.
    let mut mash = last_mash;
    while let Some(msg) = outbox.next_within(Duration::from_millis(50)) {
        if msg.sender == Vessel::Mash.uid() {
            mash = msg.value.and_then(|v| v.as_f64()).unwrap();
        }
    }
    assert!(mash >= last_mash);
    let ledger = brewery.ledger();
    assert_close(ledger.volume(Vessel::Source) + ledger.volume(Vessel::Mash), 7.0);
    assert!(!ledger.mash_fill_running());

    brewery.dispatch(&Message::switch(BOIL_VALVE, true));
    assert_eq!(next(&outbox, Vessel::Mash), 0.0);
    assert_close(next(&outbox, Vessel::Boil), mash);
}
