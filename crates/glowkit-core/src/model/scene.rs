// ── Scene domain types ──

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::selector::Selector;

/// A partial light configuration. Unset fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub power: Option<bool>,
    pub color: Option<Color>,
    pub brightness: Option<f64>,
}

impl StateChange {
    pub fn power(on: bool) -> Self {
        Self {
            power: Some(on),
            ..Self::default()
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn brightness(brightness: f64) -> Self {
        Self {
            brightness: Some(brightness),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_none() && self.color.is_none() && self.brightness.is_none()
    }
}

/// One entry of a scene: a selector plus the state to apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub selector: Selector,
    #[serde(flatten)]
    pub change: StateChange,
}

/// A named, server-stored bundle of per-selector states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub uuid: String,
    pub name: String,
    pub states: Vec<State>,
}

impl Scene {
    pub fn to_selector(&self) -> Selector {
        Selector::scene(self.uuid.clone())
    }
}
