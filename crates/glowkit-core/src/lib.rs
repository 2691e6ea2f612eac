// glowkit-core: Client-side light cache, reconciliation and target
// selection on top of glowkit-api.

pub mod client;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod resolve;
pub mod store;
pub mod stream;
pub mod target;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::Client;
pub use command::{Command, CommandHandle};
pub use config::{ClientConfig, RollbackPolicy, SyncOptions};
pub use error::CoreError;
pub use resolve::Matcher;
pub use store::{LightStore, LightsObserver, ObserverToken, merge_lights};
pub use stream::{LightStream, LightWatchStream};
pub use target::Target;

pub use model::{
    Color, Group, Light, Location, OperationResult, OperationStatus, Scene, Selector,
    SelectorKind, SelectorParseError, State, StateChange,
};
