// glowkit-api: Async Rust client for the cloud lighting HTTP API

pub mod api;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use api::LightsApi;
pub use error::Error;
pub use session::HttpSession;
pub use transport::SessionConfig;
