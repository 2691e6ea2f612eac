//! Shared configuration for glowkit tools.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `glowkit_core::ClientConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use glowkit_api::SessionConfig;
use glowkit_api::transport::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use glowkit_core::{ClientConfig, RollbackPolicy, SyncOptions};

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "glowkit";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is requested explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named service profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    pub user_agent: Option<String>,

    /// What to do with optimistic updates whose command failed.
    #[serde(default)]
    pub rollback: RollbackPolicy,

    /// Background refresh interval for long-running consumers.
    pub refresh_interval_secs: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            token_env: None,
            timeout: None,
            user_agent: None,
            rollback: RollbackPolicy::default(),
            refresh_interval_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "glowkit", "glowkit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("glowkit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment overrides use `GLOWKIT_` with `__` between levels, e.g.
/// `GLOWKIT_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GLOWKIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve the access token from the credential chain.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Profile → ClientConfig ──────────────────────────────────────────

/// Build a `ClientConfig` from a profile, with no CLI overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    let base_url = validate_base_url(&profile.base_url)?;
    let token = resolve_token(profile, profile_name)?;
    let timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));

    let session = SessionConfig::new(token)
        .with_base_url(base_url)
        .with_timeout(timeout)
        .with_user_agent(
            profile
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
        );

    Ok(ClientConfig::new(session).with_sync(SyncOptions {
        rollback: profile.rollback,
        refresh_interval_secs: profile.refresh_interval_secs.unwrap_or(0),
    }))
}

/// Check that `raw` is an absolute http(s) URL.
pub fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(), "default");
        assert_eq!(cfg.defaults.timeout, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                token: Some("abc".into()),
                rollback: RollbackPolicy::Revert,
                refresh_interval_secs: Some(30),
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("home".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn profile_fields_parse_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "office"

[profiles.office]
base_url = "http://localhost:9000/v1/"
token = "plain"
timeout = 12
rollback = "revert"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let profile = cfg.profile("office").unwrap();
        assert_eq!(profile.base_url, "http://localhost:9000/v1/");
        assert_eq!(profile.timeout, Some(12));
        assert_eq!(profile.rollback, RollbackPolicy::Revert);
        assert!(matches!(
            cfg.profile("other"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn unset_token_env_falls_back_to_plaintext() {
        let var = "GLOWKIT_TEST_TOKEN_NEVER_SET";
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some(var.into()),
            ..Profile::default()
        };
        let token = resolve_token(&profile, "glowkit-test-env").unwrap();
        assert_eq!(token.expose_secret(), "plain");
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = resolve_token(&Profile::default(), "glowkit-test-missing").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile } if profile == "glowkit-test-missing"));
    }

    #[test]
    fn client_config_carries_profile_settings() {
        let profile = Profile {
            base_url: "https://example.test/v1/".into(),
            token: Some("secret".into()),
            timeout: Some(9),
            user_agent: Some("custom/1".into()),
            rollback: RollbackPolicy::Revert,
            refresh_interval_secs: Some(60),
            ..Profile::default()
        };
        let cfg = profile_to_client_config(&profile, "glowkit-test-client").unwrap();
        assert_eq!(cfg.session.base_url, "https://example.test/v1/");
        assert_eq!(cfg.session.timeout, Duration::from_secs(9));
        assert_eq!(cfg.session.user_agent, "custom/1");
        assert_eq!(cfg.session.token.expose_secret(), "secret");
        assert_eq!(cfg.sync.rollback, RollbackPolicy::Revert);
        assert_eq!(cfg.sync.refresh_interval_secs, 60);
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            validate_base_url("not a url"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            validate_base_url("ftp://example.test/"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
