// ── Selector ──
//
// Typed predicate descriptor used both as the wire address of a
// request and as the local filter key for a target.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// What a [`Selector`] addresses. The string forms are the wire prefixes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectorKind {
    All,
    Id,
    GroupId,
    LocationId,
    SceneId,
    /// Deprecated: labels are not unique.
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unacceptable selector '{input}': expected 'all' or '<type>:<value>'")]
pub struct SelectorParseError {
    pub input: String,
}

/// A typed `type:value` address.
///
/// Two `All` selectors are always equal whatever their value; any other
/// pair is equal only when kind and value both match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Selector {
    kind: SelectorKind,
    value: String,
}

impl Selector {
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn all() -> Self {
        Self::new(SelectorKind::All, "")
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, id)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(SelectorKind::GroupId, id)
    }

    pub fn location(id: impl Into<String>) -> Self {
        Self::new(SelectorKind::LocationId, id)
    }

    pub fn scene(uuid: impl Into<String>) -> Self {
        Self::new(SelectorKind::SceneId, uuid)
    }

    #[deprecated(note = "labels are not unique; select by id, group or location instead")]
    pub fn label(label: impl Into<String>) -> Self {
        tracing::warn!("label selectors are deprecated and will be removed in a future version");
        Self::new(SelectorKind::Label, label)
    }

    /// Parse the canonical string form. Returns `None` for an unknown
    /// prefix or, for anything but `all`, an empty value.
    pub fn parse(input: &str) -> Option<Self> {
        let (prefix, value) = match input.split_once(':') {
            Some((prefix, value)) => (prefix, value),
            None => (input, ""),
        };
        let kind = SelectorKind::from_str(prefix).ok()?;
        match kind {
            SelectorKind::All => Some(Self::all()),
            _ if value.is_empty() => None,
            _ => Some(Self::new(kind, value)),
        }
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_scene(&self) -> bool {
        self.kind == SelectorKind::SceneId
    }

    /// Canonical wire form: `all` or `type:value`.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (SelectorKind::All, SelectorKind::All) => true,
            (a, b) => a == b && self.value == other.value,
        }
    }
}

impl Eq for Selector {}

impl Hash for Selector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        if self.kind != SelectorKind::All {
            self.value.hash(state);
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::All => f.write_str(self.kind.as_ref()),
            kind => write!(f, "{}:{}", kind.as_ref(), self.value),
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SelectorParseError { input: s.into() })
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
