//! Application core: the volume engine, free of I/O.
//!
//! The [`ledger`] owns every vessel's volume and runs the time-driven
//! transfers; [`vessel`] adapters bridge it to the message protocol.
//! Time, sensors and outbound status all cross **port traits** defined
//! in [`ports`], so the whole core runs against the doubles in
//! [`crate::sim`] in tests.

pub mod events;
pub mod ledger;
pub mod message;
pub mod ports;
pub mod transfer;
pub mod vessel;
