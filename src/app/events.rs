//! Inbound events, decoded once at the boundary.
//!
//! The transport delivers loosely-typed [`Message`]s.  [`Event::decode`]
//! turns the handful the engine cares about into a closed enum so the
//! ledger can match exhaustively; everything else becomes a
//! [`DecodeError`] that callers log and drop.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::message::{Message, MessageKind, REPORT_COMMAND};

// ───────────────────────────────────────────────────────────────
// Vessels
// ───────────────────────────────────────────────────────────────

/// The four vessels of the rig, in liquid-flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vessel {
    /// Heated water reservoir (HLT).
    Source,
    /// Grain bed vessel (mash tun).
    Mash,
    /// Boil kettle.
    Boil,
    /// Fermenter / carboy.
    Collection,
}

impl Vessel {
    pub const ALL: [Vessel; 4] = [Self::Source, Self::Mash, Self::Boil, Self::Collection];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Mash => "mash",
            Self::Boil => "boil",
            Self::Collection => "collection",
        }
    }

    /// Stable sender id used on outbound volume reports.
    pub const fn uid(self) -> &'static str {
        match self {
            Self::Source => "source volume",
            Self::Mash => "mash volume",
            Self::Boil => "boil volume",
            Self::Collection => "collection volume",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Vessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ───────────────────────────────────────────────────────────────
// Device senders
// ───────────────────────────────────────────────────────────────

/// Fill valve feeding the source vessel; opening it arms the float switch.
pub const SOURCE_VALVE: &str = "source valve";
/// Valve between source and mash (orifice-modelled transfer).
pub const MASH_VALVE: &str = "mash valve";
/// Valve between mash and boil (fixed-wait transfer).
pub const BOIL_VALVE: &str = "boil valve";
/// Pump moving boil into collection.
pub const COLLECTION_PUMP: &str = "collection pump";

// ───────────────────────────────────────────────────────────────
// Events
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Report the current volume of every vessel.
    ReportVolumes,
    /// Source fill valve opened or closed.
    SourceValve(bool),
    /// Source → mash valve opened or closed.  `target_gallons` is an
    /// optional requested fill volume carried on the open event.
    MashValve {
        open: bool,
        target_gallons: Option<f64>,
    },
    /// Mash → boil valve opened or closed.
    BoilValve(bool),
    /// Collection pump switched on or off.
    CollectionPump(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A command other than the report command.
    UnsupportedCommand,
    /// An update from a device this engine does not track.
    UnknownSender,
    /// A valve/pump update without a boolean value.
    MissingSwitchValue,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCommand => write!(f, "unsupported command"),
            Self::UnknownSender => write!(f, "unknown sender"),
            Self::MissingSwitchValue => write!(f, "missing on/off value"),
        }
    }
}

impl Event {
    pub fn decode(msg: &Message) -> Result<Self, DecodeError> {
        match msg.kind {
            MessageKind::Command if msg.body == REPORT_COMMAND => Ok(Self::ReportVolumes),
            MessageKind::Command => Err(DecodeError::UnsupportedCommand),
            MessageKind::Update => {
                let switch = || {
                    msg.value
                        .as_ref()
                        .and_then(|v| v.as_bool())
                        .ok_or(DecodeError::MissingSwitchValue)
                };
                match msg.sender.as_str() {
                    SOURCE_VALVE => Ok(Self::SourceValve(switch()?)),
                    MASH_VALVE => Ok(Self::MashValve {
                        open: switch()?,
                        target_gallons: msg.target_value.as_ref().and_then(|v| v.as_f64()),
                    }),
                    BOIL_VALVE => Ok(Self::BoilValve(switch()?)),
                    COLLECTION_PUMP => Ok(Self::CollectionPump(switch()?)),
                    _ => Err(DecodeError::UnknownSender),
                }
            }
        }
    }
}
