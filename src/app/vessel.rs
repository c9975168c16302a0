//! Vessel adapter: one per physical vessel.
//!
//! ```text
//!  inbound Message ──▶ VesselAdapter::handle ──(master only)──▶ VolumeLedger
//!                                                                   │
//!  StatusSink ◀── Reporter (VolumeListener) ◀────────────────────────┘
//! ```
//!
//! Every adapter sees every inbound message.  Only the master forwards
//! events into the shared ledger, so one valve event is applied once no
//! matter how many vessels are attached.  The report command is the
//! exception: each adapter answers it for its own vessel.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, trace, warn};

use super::events::{DecodeError, Event, Vessel};
use super::ledger::VolumeLedger;
use super::message::{Message, Value};
use super::ports::{StatusSink, VolumeListener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Forwards inbound events into the ledger.
    Master,
    /// Read-and-report view only.
    Follower,
}

/// Ledger listener that turns a new volume into an outbound update.
struct Reporter {
    vessel: Vessel,
    sink: Arc<dyn StatusSink>,
}

impl VolumeListener for Reporter {
    fn volume_changed(&self, gallons: f64) {
        trace!("{} = {:.3} gal", self.vessel.uid(), gallons);
        self.sink
            .publish(Message::update(self.vessel.uid(), Value::gallons(gallons)));
    }
}

pub struct VesselAdapter {
    vessel: Vessel,
    role: Role,
    ledger: Arc<VolumeLedger>,
    reporter: Arc<Reporter>,
}

impl VesselAdapter {
    /// Attach an adapter for `vessel` and register its listener.
    pub fn new(
        vessel: Vessel,
        role: Role,
        ledger: Arc<VolumeLedger>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let reporter = Arc::new(Reporter { vessel, sink });
        ledger.register(vessel, reporter.clone());
        Self {
            vessel,
            role,
            ledger,
            reporter,
        }
    }

    pub fn vessel(&self) -> Vessel {
        self.vessel
    }

    pub fn uid(&self) -> &'static str {
        self.vessel.uid()
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    /// Emit the current volume once so consumers see an initial state.
    pub fn start(&self) {
        info!("{} attached ({:?})", self.uid(), self.role);
        self.report();
    }

    /// React to one inbound message.
    pub fn handle(&self, msg: &Message) {
        match Event::decode(msg) {
            Ok(Event::ReportVolumes) => self.report(),
            Ok(event) if self.is_master() => {
                debug!("{}: forwarding {:?}", self.uid(), event);
                self.ledger.handle_event(event);
            }
            Ok(_) => {}
            Err(DecodeError::MissingSwitchValue) if self.is_master() => {
                warn!("{}: '{}' update without on/off value", self.uid(), msg.sender);
            }
            Err(e) => trace!("{}: ignoring '{}': {}", self.uid(), msg.sender, e),
        }
    }

    /// Consume `inbox` forever, handling each message in turn.
    pub async fn run<const N: usize>(
        &self,
        inbox: &Channel<CriticalSectionRawMutex, Message, N>,
    ) -> ! {
        loop {
            let msg = inbox.receive().await;
            self.handle(&msg);
        }
    }

    fn report(&self) {
        self.reporter
            .volume_changed(self.ledger.volume(self.vessel));
    }
}
