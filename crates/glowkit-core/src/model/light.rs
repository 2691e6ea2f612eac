// ── Light domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::scene::StateChange;
use super::selector::Selector;

/// A named collection of lights. Each light carries its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn to_selector(&self) -> Selector {
        Selector::group(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn to_selector(&self) -> Selector {
        Selector::location(self.id.clone())
    }
}

/// Last known state of a single device.
///
/// Equality is structural over every field except `touched_at`.
/// Lights are never mutated in place; updates build a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub power: bool,
    /// 0.0–1.0.
    pub brightness: f64,
    pub color: Color,
    pub label: String,
    /// Whether the device is currently reachable by the service.
    pub connected: bool,
    pub group: Option<Group>,
    pub location: Option<Location>,
    /// When this record was last observed or locally updated.
    pub touched_at: DateTime<Utc>,
}

impl Light {
    pub fn to_selector(&self) -> Selector {
        Selector::id(self.id.clone())
    }

    /// Copy of this light with `change` applied and `touched_at` refreshed.
    pub fn with_change(&self, change: &StateChange, now: DateTime<Utc>) -> Self {
        Self {
            power: change.power.unwrap_or(self.power),
            brightness: change.brightness.unwrap_or(self.brightness),
            color: change.color.unwrap_or(self.color),
            touched_at: now,
            ..self.clone()
        }
    }

    pub fn with_connected(&self, connected: bool, now: DateTime<Utc>) -> Self {
        Self {
            connected,
            touched_at: now,
            ..self.clone()
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.id.as_str())
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.id.as_str())
    }
}

impl PartialEq for Light {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.power == other.power
            && self.brightness == other.brightness
            && self.color == other.color
            && self.label == other.label
            && self.connected == other.connected
            && self.group == other.group
            && self.location == other.location
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {:.0}% {}",
            self.label,
            self.id,
            if self.power { "on" } else { "off" },
            self.brightness * 100.0,
            self.color
        )
    }
}
