//! Deterministic doubles for the engine's time and sensor ports.
//!
//! - [`GateTicker`]: a tick only happens when the test calls [`GateTicker::fire`].
//! - [`SteppedStopwatch`]: every `elapsed()` call advances by a fixed step.
//! - [`ScriptedFloatSwitch`]: `wait()` returns whatever the test pushed.
//!
//! Together they let a test replay an exact valve/tick/sensor sequence
//! and assert exact volumes, with no real sleeps.

use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use std::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::{LevelSensor, Stopwatch, TickSource};
use crate::error::SensorError;

/// Ticks that can be fired ahead of the task waiting for them.
const GATE_DEPTH: usize = 16;

/// Sensor readings that can be queued ahead of `wait()`.
const SCRIPT_DEPTH: usize = 8;

// ───────────────────────────────────────────────────────────────
// Hand-fired tick source
// ───────────────────────────────────────────────────────────────

/// Tick source whose ticks are fired by hand.  The requested period is
/// ignored.  Fired ticks queue up, each one releasing one `after()`.
pub struct GateTicker {
    gate: Channel<CriticalSectionRawMutex, (), GATE_DEPTH>,
}

impl GateTicker {
    pub const fn new() -> Self {
        Self {
            gate: Channel::new(),
        }
    }

    /// Release one pending (or the next) `after()` future.
    pub fn fire(&self) {
        if self.gate.try_send(()).is_err() {
            warn!("GateTicker: {} ticks already queued, dropping", GATE_DEPTH);
        }
    }

    /// Ticks fired but not yet consumed.
    pub fn pending(&self) -> usize {
        self.gate.len()
    }
}

impl Default for GateTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for GateTicker {
    fn after(&self, _period: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            self.gate.receive().await;
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Stepped stopwatch
// ───────────────────────────────────────────────────────────────

/// Stopwatch that reports `step`, `2·step`, `3·step`, … on successive
/// `elapsed()` calls after each `start()`, regardless of real time.
pub struct SteppedStopwatch {
    step: Duration,
    calls: AtomicU32,
}

impl SteppedStopwatch {
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            calls: AtomicU32::new(0),
        }
    }
}

impl Stopwatch for SteppedStopwatch {
    fn start(&self) {
        self.calls.store(0, Ordering::Release);
    }

    fn elapsed(&self) -> Duration {
        let n = self.calls.fetch_add(1, Ordering::AcqRel) + 1;
        self.step * n
    }
}

// ───────────────────────────────────────────────────────────────
// Scripted float switch
// ───────────────────────────────────────────────────────────────

/// Float switch whose transitions are pushed by the test.
pub struct ScriptedFloatSwitch {
    readings: Channel<CriticalSectionRawMutex, Result<bool, SensorError>, SCRIPT_DEPTH>,
}

impl ScriptedFloatSwitch {
    pub const fn new() -> Self {
        Self {
            readings: Channel::new(),
        }
    }

    /// Queue the next result `wait()` will return.
    pub fn push(&self, reading: Result<bool, SensorError>) {
        if self.readings.try_send(reading).is_err() {
            warn!("ScriptedFloatSwitch: script full, dropping reading");
        }
    }

    /// Convenience: the switch trips.
    pub fn trip(&self) {
        self.push(Ok(true));
    }
}

impl Default for ScriptedFloatSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSensor for ScriptedFloatSwitch {
    fn wait(&self) -> Result<bool, SensorError> {
        futures_lite::future::block_on(self.readings.receive())
    }
}
