//! Channel-backed status sink.
//!
//! Bridges outbound volume reports from ledger/transfer threads to the
//! transport task through a bounded `embassy-sync` channel.  Publishing
//! never blocks: if the transport falls behind, the report is dropped
//! and logged.  The next sample supersedes it anyway.
//!
//! ```text
//!  transfer thread ──publish()──▶ [Channel] ──receive().await──▶ transport
//! ```

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future;
use log::warn;

use crate::app::message::Message;
use crate::app::ports::StatusSink;

/// Channel depth for outbound status messages.
pub const STATUS_DEPTH: usize = 64;

pub struct ChannelSink {
    channel: Channel<CriticalSectionRawMutex, Message, STATUS_DEPTH>,
}

impl ChannelSink {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Next outbound message (transport side).
    pub async fn receive(&self) -> Message {
        self.channel.receive().await
    }

    /// Next outbound message if one is queued.
    pub fn try_receive(&self) -> Option<Message> {
        self.channel.try_receive().ok()
    }

    /// Blocking receive with a deadline, for synchronous consumers.
    pub fn next_within(&self, timeout: Duration) -> Option<Message> {
        future::block_on(future::or(
            async { Some(self.channel.receive().await) },
            async {
                async_io_mini::Timer::after(timeout).await;
                None
            },
        ))
    }

    /// Take everything currently queued.
    pub fn drain(&self) -> Vec<Message> {
        core::iter::from_fn(|| self.try_receive()).collect()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ChannelSink {
    fn publish(&self, msg: Message) {
        if let Err(embassy_sync::channel::TrySendError::Full(msg)) = self.channel.try_send(msg) {
            warn!("status channel full, dropping report from {}", msg.sender);
        }
    }
}
