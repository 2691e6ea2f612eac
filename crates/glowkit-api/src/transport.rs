// Session configuration for building the reqwest::Client.
//
// Replaces any notion of an ambient access token: everything the
// session needs is carried by an explicit `SessionConfig`.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.lifx.com/v1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_USER_AGENT: &str = concat!("glowkit/", env!("CARGO_PKG_VERSION"));

/// Everything needed to talk to the lighting service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API root, e.g. `https://api.lifx.com/v1/`.
    pub base_url: String,
    /// Bearer access token.
    pub token: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl SessionConfig {
    /// Config with the default base URL, timeout and user agent.
    pub fn new(token: SecretString) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            token,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a `reqwest::Client` carrying the bearer token as a default header.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
