//! Volume ledger: the single owner of every vessel's volume.
//!
//! No flow meter exists on the rig, so volume is inferred:
//!
//! - **source**: set to capacity when the float switch trips while the
//!   source fill valve is open.
//! - **source → mash**: orifice drain model ([`DrainModel`]) sampled on
//!   every tick while the mash valve is open, plus one final sample at
//!   the instant it closes.
//! - **mash → boil**: the grain bed makes flow unpredictable, so after a
//!   fixed, conservative drain time the whole mash volume is assumed to
//!   be in the boil vessel.  Closing the valve early moves nothing.
//! - **boil → collection**: instantaneous when the pump switches off.
//!
//! ```text
//!   Event ──▶ handle_event ──┬─▶ mutate under lock ─┐
//!                            └─▶ spawn Transfer ─────┤ (per tick)
//!                                                    ▼
//!                                release lock ─▶ VolumeListener (per vessel)
//! ```
//!
//! All volumes are kept in millilitres behind one mutex; two-vessel
//! moves never need a lock order.  Listeners are always invoked after
//! the lock is released, in vessel order (source, mash, boil,
//! collection), and may call back into the ledger.

use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;

use futures_lite::future;
use log::{debug, info, trace, warn};

use crate::config::BreweryConfig;
use crate::error::ConfigError;
use crate::flow::DrainModel;
use crate::units::{gallons_to_ml, ml_to_gallons};

use super::events::{Event, Vessel};
use super::ports::{LevelSensor, Stopwatch, TickSource, VolumeListener};
use super::transfer::{Cancellation, Transfer};

/// A batch of `(vessel, gallons)` reports produced by one mutation.
type Notifications = heapless::Vec<(Vessel, f64), 4>;

/// Time and sensor ports the ledger runs on.
#[derive(Clone)]
pub struct LedgerPorts {
    /// Paces source → mash samples and the mash → boil wait.
    pub ticker: Arc<dyn TickSource>,
    /// Elapsed time seen by each source → mash sample.
    pub stopwatch: Arc<dyn Stopwatch>,
    /// Float switch at the top of the source vessel.
    pub float_switch: Arc<dyn LevelSensor>,
}

#[derive(Default)]
struct Transfers {
    /// Source → mash.
    mash_fill: Option<Transfer>,
    /// Mash → boil.
    boil_fill: Option<Transfer>,
}

/// Volumes captured when the mash valve opened.
#[derive(Debug, Clone, Copy)]
struct FillStart {
    source_ml: f64,
    mash_ml: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Tick,
    Cancelled,
}

pub struct VolumeLedger {
    /// Millilitres, indexed by [`Vessel`].
    volumes: Mutex<[f64; 4]>,
    listeners: RwLock<[Option<Arc<dyn VolumeListener>>; 4]>,
    transfers: Mutex<Transfers>,

    model: DrainModel,
    source_capacity_ml: f64,
    tick_interval: Duration,
    mash_drain: Duration,
    ports: LedgerPorts,

    source_valve_open: AtomicBool,
    watching_float: AtomicBool,
    /// Set by every source valve open; cleared when a watch begins.
    rearm_float: AtomicBool,
}

impl VolumeLedger {
    /// Build a ledger for one brew session.  Every vessel starts empty.
    pub fn new(config: &BreweryConfig, ports: LedgerPorts) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        Ok(Arc::new(Self {
            volumes: Mutex::new([0.0; 4]),
            listeners: RwLock::new([None, None, None, None]),
            transfers: Mutex::new(Transfers::default()),
            model: DrainModel::new(
                config.source_radius_cm,
                config.valve_radius_cm,
                config.discharge_coefficient,
            ),
            source_capacity_ml: gallons_to_ml(config.source_capacity_gallons),
            tick_interval: Duration::from_millis(u64::from(config.tick_interval_ms)),
            mash_drain: Duration::from_secs(u64::from(config.mash_drain_secs)),
            ports,
            source_valve_open: AtomicBool::new(false),
            watching_float: AtomicBool::new(false),
            rearm_float: AtomicBool::new(false),
        }))
    }

    pub fn drain_model(&self) -> &DrainModel {
        &self.model
    }

    // ── Listeners ─────────────────────────────────────────────

    /// Register the listener for `vessel`.  Do this before any events
    /// arrive; a later registration replaces the previous listener.
    pub fn register(&self, vessel: Vessel, listener: Arc<dyn VolumeListener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        if listeners[vessel.index()].replace(listener).is_some() {
            warn!("{}: volume listener replaced", vessel);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current volume of `vessel`, in gallons.
    pub fn volume(&self, vessel: Vessel) -> f64 {
        ml_to_gallons(self.lock_volumes()[vessel.index()])
    }

    /// Current volume of every vessel, in gallons.
    pub fn volumes(&self) -> [(Vessel, f64); 4] {
        let v = self.lock_volumes();
        Vessel::ALL.map(|vessel| (vessel, ml_to_gallons(v[vessel.index()])))
    }

    pub fn mash_fill_running(&self) -> bool {
        self.lock_transfers()
            .mash_fill
            .as_ref()
            .is_some_and(Transfer::is_running)
    }

    pub fn boil_fill_running(&self) -> bool {
        self.lock_transfers()
            .boil_fill
            .as_ref()
            .is_some_and(Transfer::is_running)
    }

    // ── Mutations ─────────────────────────────────────────────

    /// Manually correct a vessel's volume (gallons) and report it.
    /// Negative or non-finite values are rejected.
    pub fn set_volume(&self, vessel: Vessel, gallons: f64) {
        if !(gallons.is_finite() && gallons >= 0.0) {
            warn!("{}: rejecting volume {}", vessel, gallons);
            return;
        }
        let updates = {
            let mut v = self.lock_volumes();
            v[vessel.index()] = gallons_to_ml(gallons);
            collect(&v, &[vessel])
        };
        self.notify(&updates);
    }

    /// Apply one decoded inbound event.
    pub fn handle_event(self: &Arc<Self>, event: Event) {
        match event {
            Event::ReportVolumes => {
                let updates = collect(&self.lock_volumes(), &Vessel::ALL);
                self.notify(&updates);
            }
            Event::SourceValve(true) => {
                self.source_valve_open.store(true, Ordering::Release);
                self.watch_float_switch();
            }
            Event::SourceValve(false) => {
                self.source_valve_open.store(false, Ordering::Release);
            }
            Event::MashValve {
                open: true,
                target_gallons,
            } => self.start_mash_fill(target_gallons),
            Event::MashValve { open: false, .. } => {
                self.stop_transfer("mash fill", |t| &mut t.mash_fill);
            }
            Event::BoilValve(true) => self.start_boil_fill(),
            Event::BoilValve(false) => {
                self.stop_transfer("boil fill", |t| &mut t.boil_fill);
            }
            Event::CollectionPump(false) => self.fill_collection(),
            Event::CollectionPump(true) => debug!("collection pump on"),
        }
    }

    /// Cancel any running transfer.
    pub fn shutdown(&self) {
        self.source_valve_open.store(false, Ordering::Release);
        self.stop_transfer("mash fill", |t| &mut t.mash_fill);
        self.stop_transfer("boil fill", |t| &mut t.boil_fill);
    }

    // ── Source (float switch) ─────────────────────────────────

    fn watch_float_switch(self: &Arc<Self>) {
        // A running watcher checks `rearm` before it exits.
        self.rearm_float.store(true, Ordering::SeqCst);
        if self.watching_float.swap(true, Ordering::SeqCst) {
            debug!("float switch already armed");
            return;
        }
        let ledger = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("float-switch".into())
            .spawn(move || ledger.wait_for_full());
        if let Err(e) = spawned {
            self.watching_float.store(false, Ordering::SeqCst);
            warn!("float switch watch not started: {}", e);
        }
    }

    /// Watcher thread body.  Runs one watch per arming, including an
    /// open event that arrived while the previous watch was ending.
    fn wait_for_full(&self) {
        loop {
            self.rearm_float.store(false, Ordering::SeqCst);
            self.watch_once();
            self.watching_float.store(false, Ordering::SeqCst);

            let rearmed = self.rearm_float.load(Ordering::SeqCst)
                && self.source_valve_open.load(Ordering::Acquire);
            if !rearmed || self.watching_float.swap(true, Ordering::SeqCst) {
                return;
            }
            debug!("source valve reopened while float watch ended, re-arming");
        }
    }

    /// Block on the float switch until it reports full (or fails, or
    /// the source valve has been closed in the meantime).
    fn watch_once(&self) {
        loop {
            let valve_open = || self.source_valve_open.load(Ordering::Acquire);
            match self.ports.float_switch.wait() {
                Ok(true) if valve_open() => {
                    self.fill_source();
                    break;
                }
                Ok(true) => {
                    debug!("float switch full with source valve closed, ignored");
                    break;
                }
                Ok(false) if valve_open() => trace!("float switch cleared, still waiting"),
                Ok(false) => break,
                Err(e) => {
                    warn!("float switch wait failed: {}; source volume unchanged", e);
                    break;
                }
            }
        }
    }

    fn fill_source(&self) {
        let updates = {
            let mut v = self.lock_volumes();
            v[Vessel::Source.index()] = self.source_capacity_ml;
            collect(&v, &[Vessel::Source])
        };
        info!(
            "source full: {:.2} gal",
            ml_to_gallons(self.source_capacity_ml)
        );
        self.notify(&updates);
    }

    // ── Source → mash (orifice model) ─────────────────────────

    fn start_mash_fill(self: &Arc<Self>, target_gallons: Option<f64>) {
        let mut transfers = self.lock_transfers();
        if transfers.mash_fill.as_ref().is_some_and(Transfer::is_running) {
            debug!("mash fill already running");
            return;
        }
        if let Some(finished) = transfers.mash_fill.take() {
            finished.cancel();
        }

        let start = {
            let v = self.lock_volumes();
            FillStart {
                source_ml: v[Vessel::Source.index()],
                mash_ml: v[Vessel::Mash.index()],
            }
        };
        if let Some(target) = target_gallons {
            self.log_fill_estimate(start, target);
        }
        self.ports.stopwatch.start();

        let ledger = Arc::clone(self);
        match Transfer::spawn("mash-fill", move |cancel| async move {
            ledger.run_mash_fill(start, cancel).await;
        }) {
            Ok(transfer) => {
                info!(
                    "mash fill started: source {:.3} gal, mash {:.3} gal",
                    ml_to_gallons(start.source_ml),
                    ml_to_gallons(start.mash_ml)
                );
                transfers.mash_fill = Some(transfer);
            }
            Err(e) => warn!("mash fill not started: {}", e),
        }
    }

    async fn run_mash_fill(&self, start: FillStart, cancel: Cancellation) {
        loop {
            let woke = self.next_wake(&cancel, self.tick_interval).await;
            self.sample_mash_fill(start);
            if woke == Wake::Cancelled {
                info!("mash fill stopped");
                return;
            }
        }
    }

    /// Recompute both vessels from the start snapshot and total elapsed
    /// time, never from the previous sample.
    fn sample_mash_fill(&self, start: FillStart) {
        let elapsed = self.ports.stopwatch.elapsed().as_secs_f64();
        let drained = self.model.drained_volume(start.source_ml, elapsed);
        let updates = {
            let mut v = self.lock_volumes();
            v[Vessel::Source.index()] = start.source_ml - drained;
            v[Vessel::Mash.index()] = start.mash_ml + drained;
            collect(&v, &[Vessel::Source, Vessel::Mash])
        };
        trace!("mash fill t={:.1}s drained={:.1}mL", elapsed, drained);
        self.notify(&updates);
    }

    fn log_fill_estimate(&self, start: FillStart, target_gallons: f64) {
        let needed = gallons_to_ml(target_gallons) - start.mash_ml;
        if needed <= 0.0 {
            info!("mash already holds {:.2} gal target", target_gallons);
            return;
        }
        match self.model.drain_time(start.source_ml, needed) {
            Some(secs) => info!(
                "mash fill to {:.2} gal: ~{:.0}s with valve open",
                target_gallons, secs
            ),
            None => warn!(
                "mash fill to {:.2} gal: source holds only {:.2} gal",
                target_gallons,
                ml_to_gallons(start.source_ml)
            ),
        }
    }

    // ── Mash → boil (fixed wait) ──────────────────────────────

    fn start_boil_fill(self: &Arc<Self>) {
        let mut transfers = self.lock_transfers();
        if transfers.boil_fill.as_ref().is_some_and(Transfer::is_running) {
            debug!("boil fill already running");
            return;
        }
        if let Some(finished) = transfers.boil_fill.take() {
            finished.cancel();
        }

        let ledger = Arc::clone(self);
        match Transfer::spawn("boil-fill", move |cancel| async move {
            ledger.run_boil_fill(cancel).await;
        }) {
            Ok(transfer) => {
                info!("boil fill started: waiting {:?} for mash to drain", self.mash_drain);
                transfers.boil_fill = Some(transfer);
            }
            Err(e) => warn!("boil fill not started: {}", e),
        }
    }

    async fn run_boil_fill(&self, cancel: Cancellation) {
        if self.next_wake(&cancel, self.mash_drain).await == Wake::Cancelled {
            info!("boil fill stopped before mash drained; no volume moved");
            return;
        }
        let updates = {
            let mut v = self.lock_volumes();
            v[Vessel::Boil.index()] = v[Vessel::Mash.index()];
            v[Vessel::Mash.index()] = 0.0;
            collect(&v, &[Vessel::Mash, Vessel::Boil])
        };
        info!("mash drained into boil");
        self.notify(&updates);
    }

    // ── Boil → collection (instant) ───────────────────────────

    fn fill_collection(&self) {
        let updates = {
            let mut v = self.lock_volumes();
            v[Vessel::Collection.index()] = v[Vessel::Boil.index()];
            v[Vessel::Boil.index()] = 0.0;
            collect(&v, &[Vessel::Boil, Vessel::Collection])
        };
        info!("boil pumped into collection");
        self.notify(&updates);
    }

    // ── Internal ──────────────────────────────────────────────

    /// Wait for either the next tick or cancellation.  Cancellation is
    /// polled first so it wins when both are ready.
    async fn next_wake(&self, cancel: &Cancellation, period: Duration) -> Wake {
        future::or(
            async {
                cancel.cancelled().await;
                Wake::Cancelled
            },
            async {
                self.ports.ticker.after(period).await;
                Wake::Tick
            },
        )
        .await
    }

    fn stop_transfer(&self, what: &str, slot: fn(&mut Transfers) -> &mut Option<Transfer>) {
        // Take the handle, then release the lock before joining: the
        // task's final notification may re-enter the ledger.
        let transfer = slot(&mut self.lock_transfers()).take();
        match transfer {
            Some(t) => {
                if t.cancel() {
                    debug!("{} cancelled", what);
                } else {
                    debug!("{} had already finished", what);
                }
            }
            None => debug!("no {} in progress, close ignored", what),
        }
    }

    fn notify(&self, updates: &Notifications) {
        for &(vessel, gallons) in updates {
            let listener = self.listeners.read().unwrap_or_else(PoisonError::into_inner)
                [vessel.index()]
            .clone();
            match listener {
                Some(l) => l.volume_changed(gallons),
                None => trace!("{}: no listener registered", vessel),
            }
        }
    }

    fn lock_volumes(&self) -> MutexGuard<'_, [f64; 4]> {
        self.volumes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_transfers(&self) -> MutexGuard<'_, Transfers> {
        self.transfers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot `vessels` (in the given order) as gallons.
fn collect(volumes: &[f64; 4], vessels: &[Vessel]) -> Notifications {
    vessels
        .iter()
        .take(4)
        .map(|&v| (v, ml_to_gallons(volumes[v.index()])))
        .collect()
}
