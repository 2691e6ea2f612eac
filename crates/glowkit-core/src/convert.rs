// ── Wire → domain conversion ──
//
// Translates `glowkit-api` response types into the canonical model and
// builds request bodies from domain changes.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use glowkit_api::types::{
    ColorResponse, GroupResponse, LightResponse, LocationResponse, PowerValue, ResultResponse,
    ResultStatus, SceneResponse, StateChangeRequest, StateResponse,
};

use crate::model::{
    Color, Group, Light, Location, OperationResult, OperationStatus, Scene, Selector, State,
    StateChange,
};

impl From<ColorResponse> for Color {
    fn from(c: ColorResponse) -> Self {
        Color::new(c.hue, c.saturation, c.kelvin)
    }
}

impl From<GroupResponse> for Group {
    fn from(g: GroupResponse) -> Self {
        Group::new(g.id, g.name)
    }
}

impl From<LocationResponse> for Location {
    fn from(l: LocationResponse) -> Self {
        Location::new(l.id, l.name)
    }
}

impl From<LightResponse> for Light {
    fn from(l: LightResponse) -> Self {
        let power = l.is_on();
        Light {
            id: l.id,
            power,
            brightness: l.brightness,
            color: l.color.into(),
            label: l.label,
            connected: l.connected,
            group: l.group.map(Group::from),
            location: l.location.map(Location::from),
            touched_at: Utc::now(),
        }
    }
}

/// States whose selector cannot be parsed are dropped.
fn convert_state(s: StateResponse) -> Option<State> {
    let Some(selector) = Selector::parse(&s.selector) else {
        debug!(selector = %s.selector, "dropping scene state with unacceptable selector");
        return None;
    };
    Some(State {
        selector,
        change: StateChange {
            power: s.power.map(|p| p == "on"),
            color: s.color.map(Color::from),
            brightness: s.brightness,
        },
    })
}

impl From<SceneResponse> for Scene {
    fn from(s: SceneResponse) -> Self {
        Scene {
            uuid: s.uuid,
            name: s.name,
            states: s.states.into_iter().filter_map(convert_state).collect(),
        }
    }
}

impl From<ResultStatus> for OperationStatus {
    fn from(s: ResultStatus) -> Self {
        match s {
            ResultStatus::Ok => Self::Ok,
            ResultStatus::TimedOut => Self::TimedOut,
            ResultStatus::Offline => Self::Offline,
            ResultStatus::Unknown => Self::Unknown,
        }
    }
}

impl From<ResultResponse> for OperationResult {
    fn from(r: ResultResponse) -> Self {
        OperationResult {
            id: r.id,
            status: r.status.into(),
        }
    }
}

/// Build the wire body for a state change with the given transition time.
pub(crate) fn state_change_request(change: &StateChange, duration: Duration) -> StateChangeRequest {
    StateChangeRequest {
        power: change.power.map(PowerValue::from),
        color: change.color.as_ref().map(Color::to_wire),
        brightness: change.brightness,
        duration: duration.as_secs_f64(),
    }
}
