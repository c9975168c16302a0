//! Wall-clock time adapter.
//!
//! Production implementations of the time ports:
//!
//! - [`WallTicker`]: `after()` is an `async-io-mini` reactor timer, so a
//!   waiting transfer parks instead of spinning.
//! - [`WallStopwatch`]: `std::time::Instant` since the last `start()`.

use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::app::ports::{Stopwatch, TickSource};

/// Tick source backed by the reactor's timer queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallTicker;

impl WallTicker {
    pub fn new() -> Self {
        Self
    }
}

impl TickSource for WallTicker {
    fn after(&self, period: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            async_io_mini::Timer::after(period).await;
        })
    }
}

/// Monotonic stopwatch.
pub struct WallStopwatch {
    start: Mutex<Instant>,
}

impl Default for WallStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl WallStopwatch {
    pub fn new() -> Self {
        Self {
            start: Mutex::new(Instant::now()),
        }
    }
}

impl Stopwatch for WallStopwatch {
    fn start(&self) {
        *self.start.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.start
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}
