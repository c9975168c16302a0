//! Wire messages exchanged with the pub/sub transport.
//!
//! The same shape carries inbound control events (valve and pump state
//! changes, "report" commands) and outbound volume reports.  Field names
//! are PascalCase on the wire to match the rest of the control system.
//! `Uuid` and `Timestamp` belong to the transport; the engine never sets
//! them and never reads them.

use serde::{Deserialize, Serialize};

use crate::units::DISPLAY_UNITS;

/// Body of the command that asks every vessel to report its volume.
pub const REPORT_COMMAND: &str = "update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Command,
    Update,
}

/// Typed payload: an on/off state or a quantity with a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Switch { value: bool },
    Quantity { value: f64, units: String },
}

impl Value {
    pub fn switch(on: bool) -> Self {
        Self::Switch { value: on }
    }

    pub fn gallons(value: f64) -> Self {
        Self::Quantity {
            value,
            units: DISPLAY_UNITS.to_owned(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Switch { value } => Some(*value),
            Self::Quantity { .. } => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Quantity { value, .. } => Some(*value),
            Self::Switch { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub sender: String,
    #[serde(rename = "Type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// A state/status update from `sender`.
    pub fn update(sender: impl Into<String>, value: Value) -> Self {
        Self {
            uuid: None,
            sender: sender.into(),
            kind: MessageKind::Update,
            body: String::new(),
            value: Some(value),
            target_value: None,
            timestamp: None,
        }
    }

    /// An on/off update, as published by valves and pumps.
    pub fn switch(sender: impl Into<String>, on: bool) -> Self {
        Self::update(sender, Value::switch(on))
    }

    /// A command with the given body.
    pub fn command(body: impl Into<String>) -> Self {
        Self {
            uuid: None,
            sender: String::new(),
            kind: MessageKind::Command,
            body: body.into(),
            value: None,
            target_value: None,
            timestamp: None,
        }
    }

    /// The "every vessel, report your volume" command.
    pub fn report() -> Self {
        Self::command(REPORT_COMMAND)
    }

    /// Attach a requested target volume (gallons).
    pub fn with_target_gallons(mut self, gallons: f64) -> Self {
        self.target_value = Some(Value::gallons(gallons));
        self
    }
}
