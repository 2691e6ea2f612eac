// ── Core error types ──
//
// Network errors from `glowkit-api` pass through untouched. The
// remaining variants are raised by the engine itself. Local resolution
// never errors: an unresolvable selector is simply an empty target.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Collaborator error, propagated verbatim.
    #[error(transparent)]
    Api(#[from] glowkit_api::Error),

    #[error("Invalid selector: {input:?}")]
    InvalidSelector { input: String },

    #[error("Scene not found: {uuid}")]
    SceneNotFound { uuid: String },

    #[error("Target {selector} is not a scene")]
    NotAScene { selector: String },

    /// The client was shut down before the command ran.
    #[error("Client closed")]
    ClientClosed,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The wrapped collaborator error, if this came from the network.
    pub fn api_error(&self) -> Option<&glowkit_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        self.api_error().is_some_and(glowkit_api::Error::is_auth_error)
    }
}
