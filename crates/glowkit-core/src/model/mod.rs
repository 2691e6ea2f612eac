// ── Domain model ──
//
// Immutable value records for lights, groups, locations, scenes and
// the selectors that address them.

pub mod color;
pub mod light;
pub mod result;
pub mod scene;
pub mod selector;

pub use color::Color;
pub use light::{Group, Light, Location};
pub use result::{OperationResult, OperationStatus};
pub use scene::{Scene, State, StateChange};
pub use selector::{Selector, SelectorKind, SelectorParseError};
