//! Host time driver for `embassy-time`.
//!
//! `async-io-mini` timers sit on `embassy-time`, which resolves its
//! clock and wake scheduler through two link-time symbols.  On the host
//! the clock is microseconds since first use (the default 1 MHz tick)
//! and each wake request parks a short-lived thread until the deadline.

use core::task::Waker;
use core::time::Duration;
use std::sync::OnceLock;
use std::time::Instant;

use log::warn;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Ticks (µs) since the driver was first queried.  Monotonic.
#[unsafe(no_mangle)]
pub fn _embassy_time_now() -> u64 {
    let micros = EPOCH.get_or_init(Instant::now).elapsed().as_micros();
    u64::try_from(micros).unwrap_or(u64::MAX)
}

/// Wake `waker` once the clock reaches `at`.
#[unsafe(no_mangle)]
pub fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let now = _embassy_time_now();
    if at <= now {
        waker.wake_by_ref();
        return;
    }
    let sleeper = waker.clone();
    let spawned = std::thread::Builder::new()
        .name("time-wake".into())
        .spawn(move || {
            std::thread::sleep(Duration::from_micros(at - _embassy_time_now().min(at)));
            sleeper.wake();
        });
    if let Err(e) = spawned {
        // An early wake is harmless: the timer re-checks and re-schedules.
        warn!("time driver: wake thread not started: {}", e);
        waker.wake_by_ref();
    }
}
