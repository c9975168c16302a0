//! Brewery volume engine.
//!
//! Tracks liquid volume across the four vessels of a brewing rig
//! (source, mash, boil, collection) without any flow meter: volumes
//! are inferred from valve and pump events, a float switch and an
//! orifice drain model, then reported back over the message bus.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod brewery;
pub mod config;
pub mod error;
pub mod flow;
pub mod sim;
mod time_driver;
pub mod units;

pub use app::events::{Event, Vessel};
pub use app::message::Message;
pub use brewery::Brewery;
pub use config::BreweryConfig;
