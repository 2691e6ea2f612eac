//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use glowkit_config::ConfigError;
use glowkit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const RATE_LIMITED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the lighting service")]
    #[diagnostic(
        code(glow::connection_failed),
        help(
            "Check your network connection and the configured base URL.\n\
             Try: glow config show"
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(glow::timeout),
        help("Increase the timeout with --timeout or in your profile.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(glow::auth_failed),
        help(
            "Verify your access token.\n\
             Run: glow config init"
        )
    )]
    AuthFailed,

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(glow::no_credentials),
        help(
            "Configure a token with: glow config init\n\
             Or set the GLOWKIT_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Rate limited by the lighting service")]
    #[diagnostic(code(glow::rate_limited), help("Wait a moment and try again."))]
    RateLimited,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(glow::not_found),
        help("Run: glow {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(glow::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(glow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(glow::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: glow config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(glow::config))]
    Config(Box<figment::Error>),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::RateLimited => exit_code::RATE_LIMITED,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => api.into(),

            CoreError::InvalidSelector { input } => CliError::Validation {
                field: "selector".into(),
                reason: format!("cannot parse '{input}'"),
            },

            CoreError::SceneNotFound { uuid } => CliError::NotFound {
                resource_type: "scene".into(),
                identifier: uuid,
                list_command: "scenes list".into(),
            },

            CoreError::NotAScene { selector } => CliError::Validation {
                field: "selector".into(),
                reason: format!("'{selector}' is not a scene"),
            },

            CoreError::ClientClosed => CliError::ApiError {
                code: "client_closed".into(),
                message: "client shut down before the command ran".into(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<glowkit_api::Error> for CliError {
    fn from(err: glowkit_api::Error) -> Self {
        use glowkit_api::Error as ApiErr;

        match err {
            ApiErr::Unauthorized | ApiErr::Forbidden => CliError::AuthFailed,
            ApiErr::RateLimited => CliError::RateLimited,
            ApiErr::Transport(e) if e.is_timeout() => CliError::Timeout,
            ApiErr::Transport(e) => CliError::ConnectionFailed {
                source: Box::new(e),
            },
            ApiErr::InvalidUrl(e) => CliError::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            ApiErr::InvalidToken(reason) => CliError::Validation {
                field: "token".into(),
                reason,
            },
            ApiErr::ServerError { status } => CliError::ApiError {
                code: "server_error".into(),
                message: format!("service returned HTTP {status}"),
            },
            other @ (ApiErr::UnexpectedStatus { .. } | ApiErr::MalformedResponse { .. }) => {
                CliError::ApiError {
                    code: "unexpected_response".into(),
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Keyring(e) => CliError::Validation {
                field: "keyring".into(),
                reason: e.to_string(),
            },
        }
    }
}
