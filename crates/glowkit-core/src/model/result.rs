use serde::{Deserialize, Serialize};
use strum::Display;

/// Per-light outcome reported by the service for a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationStatus {
    Ok,
    TimedOut,
    Offline,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Light id.
    pub id: String,
    pub status: OperationStatus,
}
