//! Log-based status sink adapter.
//!
//! Implements [`StatusSink`] by writing every outbound volume report to
//! the `log` facade.  Useful on its own for bench runs, or composed
//! with a transport sink via [`Tee`].

use log::info;

use crate::app::message::{Message, Value};
use crate::app::ports::StatusSink;

/// Adapter that logs every status message.
pub struct LogStatusSink;

impl LogStatusSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for LogStatusSink {
    fn publish(&self, msg: Message) {
        match msg.value {
            Some(Value::Quantity { value, units }) => {
                info!("VOLUME | {} = {:.3} {}", msg.sender, value, units);
            }
            Some(Value::Switch { value }) => {
                info!("STATUS | {} = {}", msg.sender, if value { "on" } else { "off" });
            }
            None => info!("STATUS | {} ({:?} {})", msg.sender, msg.kind, msg.body),
        }
    }
}

/// Publishes to two sinks in order.
pub struct Tee<A, B>(pub A, pub B);

impl<A: StatusSink, B: StatusSink> StatusSink for Tee<A, B> {
    fn publish(&self, msg: Message) {
        self.0.publish(msg.clone());
        self.1.publish(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::channel_sink::ChannelSink;

    #[test]
    fn tee_forwards_to_both() {
        let tee = Tee(LogStatusSink::new(), ChannelSink::new());
        tee.publish(Message::update("mash volume", Value::gallons(1.5)));
        assert_eq!(tee.1.len(), 1);
    }
}
