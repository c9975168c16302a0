//! Port traits: the boundary between the volume engine and the world.
//!
//! ```text
//!   TickSource ─┐                         ┌─▶ VolumeListener ─▶ StatusSink
//!   Stopwatch  ─┼──▶ VolumeLedger (domain) ┤
//!   LevelSensor ┘                         └─▶ (one listener per vessel)
//! ```
//!
//! Production adapters live in [`crate::adapters`]; deterministic
//! doubles for tests live in [`crate::sim`].  All ports are `Send + Sync`
//! because the ledger shares them with its background transfer threads.

use core::future::Future;
use core::pin::Pin;
use core::time::Duration;

use crate::error::SensorError;

use super::message::Message;

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// "Signal me after `period`."  Decides *when* the next sample happens.
pub trait TickSource: Send + Sync {
    /// One-shot future that resolves once, roughly `period` from now.
    fn after(&self, period: Duration) -> Pin<Box<dyn Future<Output = ()> + '_>>;
}

/// "How long since I said start?"  Decides *how much* time a sample sees.
///
/// Kept separate from [`TickSource`] so a test can fire ticks by hand
/// while the elapsed time advances by exact, known steps.
pub trait Stopwatch: Send + Sync {
    /// Reset the reference instant.
    fn start(&self);

    /// Time since the last [`start`](Self::start).
    fn elapsed(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Sensors
// ───────────────────────────────────────────────────────────────

/// Discrete level sensor (float switch on the source vessel).
pub trait LevelSensor: Send + Sync {
    /// Block until the sensor transitions, then return whether it now
    /// reads "full".
    fn wait(&self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

/// Receives a vessel's newly computed volume, in gallons.
///
/// Called after the ledger lock is released, so implementations may
/// call back into the ledger.
pub trait VolumeListener: Send + Sync {
    fn volume_changed(&self, gallons: f64);
}

/// Where outbound status messages go (pub/sub transport, log, test recorder).
///
/// Must not block: it is called from transfer threads.
pub trait StatusSink: Send + Sync {
    fn publish(&self, msg: Message);
}
