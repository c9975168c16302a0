//! System assembly.
//!
//! One [`Brewery`] is one brew session: a single [`VolumeLedger`]
//! shared by four [`VesselAdapter`]s, exactly one of which is master.
//! The transport hands every inbound message to [`Brewery::dispatch`]
//! (or feeds a channel drained by [`Brewery::run`]); outbound reports
//! go to the injected [`StatusSink`].

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::adapters::time::{WallStopwatch, WallTicker};
use crate::app::events::Vessel;
use crate::app::ledger::{LedgerPorts, VolumeLedger};
use crate::app::message::Message;
use crate::app::ports::{LevelSensor, StatusSink};
use crate::app::vessel::{Role, VesselAdapter};
use crate::config::BreweryConfig;
use crate::error::Result;

pub struct Brewery {
    ledger: Arc<VolumeLedger>,
    /// Indexed by [`Vessel`].
    adapters: [VesselAdapter; 4],
}

impl Brewery {
    /// Assemble a session on the given ports.  `config.master` picks the
    /// adapter that forwards events into the ledger.
    pub fn new(
        config: &BreweryConfig,
        ports: LedgerPorts,
        sink: Arc<dyn StatusSink>,
    ) -> Result<Self> {
        let ledger = VolumeLedger::new(config, ports)?;
        let adapters = Vessel::ALL.map(|vessel| {
            let role = if vessel == config.master {
                Role::Master
            } else {
                Role::Follower
            };
            VesselAdapter::new(vessel, role, Arc::clone(&ledger), Arc::clone(&sink))
        });
        info!(
            "brewery assembled: master={}, k={:.3}",
            config.master,
            ledger.drain_model().k()
        );
        Ok(Self { ledger, adapters })
    }

    /// Assemble a session on real time: timer ticks and a monotonic clock.
    pub fn with_wall_clock(
        config: &BreweryConfig,
        float_switch: Arc<dyn LevelSensor>,
        sink: Arc<dyn StatusSink>,
    ) -> Result<Self> {
        let ports = LedgerPorts {
            ticker: Arc::new(WallTicker::new()),
            stopwatch: Arc::new(WallStopwatch::new()),
            float_switch,
        };
        Self::new(config, ports, sink)
    }

    /// Every adapter emits its current volume once.
    pub fn start(&self) {
        for adapter in &self.adapters {
            adapter.start();
        }
    }

    /// Offer one inbound message to every adapter.
    pub fn dispatch(&self, msg: &Message) {
        for adapter in &self.adapters {
            adapter.handle(msg);
        }
    }

    /// Decode a raw JSON message and dispatch it.  Malformed input is
    /// logged and dropped.
    pub fn dispatch_json(&self, raw: &str) -> bool {
        match serde_json::from_str::<Message>(raw) {
            Ok(msg) => {
                self.dispatch(&msg);
                true
            }
            Err(e) => {
                warn!("dropping malformed message: {}", e);
                false
            }
        }
    }

    /// Drain `inbox` forever, dispatching each message.
    pub async fn run<const N: usize>(
        &self,
        inbox: &Channel<CriticalSectionRawMutex, Message, N>,
    ) -> ! {
        loop {
            let msg = inbox.receive().await;
            self.dispatch(&msg);
        }
    }

    pub fn ledger(&self) -> &Arc<VolumeLedger> {
        &self.ledger
    }

    pub fn adapters(&self) -> &[VesselAdapter] {
        &self.adapters
    }

    pub fn adapter(&self, vessel: Vessel) -> &VesselAdapter {
        &self.adapters[vessel.index()]
    }

    pub fn master(&self) -> Option<&VesselAdapter> {
        self.adapters.iter().find(|a| a.is_master())
    }

    /// Cancel running transfers.  Also runs on drop.
    pub fn shutdown(&self) {
        self.ledger.shutdown();
    }
}

impl Drop for Brewery {
    fn drop(&mut self) {
        self.shutdown();
    }
}
