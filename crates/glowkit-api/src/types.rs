// Wire types for the lighting HTTP API.
//
// These mirror the JSON payloads exactly. Domain conversion lives in
// `glowkit-core::convert`.

use serde::{Deserialize, Deserializer, Serialize};

// ── Lights ───────────────────────────────────────────────────────────

/// One entry of `GET lights/{selector}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightResponse {
    pub id: String,
    /// `"on"` or `"off"`.
    pub power: String,
    pub brightness: f64,
    pub color: ColorResponse,
    pub label: String,
    pub connected: bool,
    #[serde(default)]
    pub group: Option<GroupResponse>,
    #[serde(default)]
    pub location: Option<LocationResponse>,
}

impl LightResponse {
    pub fn is_on(&self) -> bool {
        self.power == "on"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorResponse {
    pub hue: f64,
    pub saturation: f64,
    pub kelvin: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: String,
    pub name: String,
}

// ── Scenes ───────────────────────────────────────────────────────────

/// One entry of `GET scenes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResponse {
    pub uuid: String,
    pub name: String,
    pub states: Vec<StateResponse>,
}

/// A per-selector partial state inside a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    pub selector: String,
    #[serde(default)]
    pub power: Option<String>,
    /// `None` when absent or incomplete; a partial color never rejects
    /// the scene.
    #[serde(default, deserialize_with = "lenient_color")]
    pub color: Option<ColorResponse>,
    #[serde(default)]
    pub brightness: Option<f64>,
}

fn lenient_color<'de, D>(deserializer: D) -> Result<Option<ColorResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

// ── State changes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerValue {
    On,
    Off,
}

impl From<bool> for PowerValue {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Body of `PUT lights/{selector}/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChangeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerValue>,
    /// Color string, e.g. `kelvin:3500` or `hue:120 saturation:0.5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Transition time in seconds.
    pub duration: f64,
}

/// Body of `PUT scenes/{selector}/activate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneActivateRequest {
    pub duration: f64,
}

// ── Results ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Ok,
    TimedOut,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Per-light outcome of a state-changing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub id: String,
    #[serde(default)]
    pub status: ResultStatus,
}

/// `{ "results": [...] }` envelope returned by mutation endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ResultsEnvelope {
    #[serde(default)]
    pub results: Vec<ResultResponse>,
}
