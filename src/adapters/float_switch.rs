//! GPIO float switch on the source vessel.
//!
//! A single-pole float switch near the top of the source vessel closes
//! when the liquid reaches capacity.  It reports only "full"/"not full";
//! there are no intermediate readings.
//!
//! [`FloatSwitch`] adapts any `embedded-hal` input pin to the blocking
//! [`LevelSensor`] port by sampling the pin until its level changes.
//! The first `wait()` after construction reports "full" immediately if
//! the switch is already tripped, since the edge has already happened.

use core::time::Duration;
use std::sync::{Mutex, PoisonError};

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::LevelSensor;
use crate::error::SensorError;

/// Default pin sampling period.
pub const DEFAULT_POLL: Duration = Duration::from_millis(50);

struct PinState<P> {
    pin: P,
    /// Last observed "full" state; `None` until the first read.
    last: Option<bool>,
}

pub struct FloatSwitch<P> {
    state: Mutex<PinState<P>>,
    /// `true` if the pin reads HIGH when the vessel is full.
    active_high: bool,
    poll: Duration,
}

impl<P: InputPin> FloatSwitch<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self::with_poll(pin, active_high, DEFAULT_POLL)
    }

    pub fn with_poll(pin: P, active_high: bool, poll: Duration) -> Self {
        Self {
            state: Mutex::new(PinState { pin, last: None }),
            active_high,
            poll,
        }
    }

    /// Sample the pin once.  Returns `Some(full)` on a transition.
    fn sample(&self) -> Result<Option<bool>, SensorError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let high = state.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        let full = high == self.active_high;
        match state.last.replace(full) {
            None if full => Ok(Some(true)),
            Some(prev) if prev != full => Ok(Some(full)),
            _ => Ok(None),
        }
    }
}

impl<P: InputPin + Send> LevelSensor for FloatSwitch<P> {
    fn wait(&self) -> Result<bool, SensorError> {
        loop {
            match self.sample() {
                Ok(Some(full)) => return Ok(full),
                Ok(None) => std::thread::sleep(self.poll),
                Err(e) => {
                    warn!("float switch: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
