use thiserror::Error;

/// Top-level error type for the `glowkit-api` crate.
///
/// Covers every failure mode of the HTTP collaborator. `glowkit-core`
/// propagates these verbatim; only the CLI maps them into diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not valid JSON or lacked required fields.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    // ── HTTP status ─────────────────────────────────────────────────
    /// 401: the access token was rejected.
    #[error("Unauthorized: bad access token")]
    Unauthorized,

    /// 403: the token lacks permission for this resource.
    #[error("Forbidden: permission denied")]
    Forbidden,

    /// 429: rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 5xx from the service.
    #[error("Server error (HTTP {status})")]
    ServerError { status: u16 },

    /// Any other status outside the expected set.
    #[error("Unexpected HTTP status: expected {expected:?}, got {got}")]
    UnexpectedStatus { expected: Vec<u16>, got: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The access token cannot be encoded as a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// Returns `true` if this is a transient error worth surfacing as "try again".
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited | Self::ServerError { .. } => true,
            _ => false,
        }
    }

    /// The HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::RateLimited => Some(429),
            Self::ServerError { status } => Some(*status),
            Self::UnexpectedStatus { got, .. } => Some(*got),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
