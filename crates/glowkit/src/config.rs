//! CLI configuration -- thin wrapper around `glowkit_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--base-url, --token, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use glowkit_api::SessionConfig;
use glowkit_api::transport::DEFAULT_USER_AGENT;
use glowkit_core::{ClientConfig, SyncOptions};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use glowkit_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, &cfg.defaults);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile -- build from flags / env vars alone.
    let bare = Profile {
        base_url: global
            .base_url
            .clone()
            .unwrap_or_else(|| Profile::default().base_url),
        ..Profile::default()
    };
    resolve_profile(&bare, &profile_name, global, &cfg.defaults)
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<ClientConfig, CliError> {
    // 1. Base URL (flag > env > profile)
    let base_url =
        glowkit_config::validate_base_url(global.base_url.as_deref().unwrap_or(&profile.base_url))?;

    // 2. Token (flag > profile env > keyring > plaintext)
    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => glowkit_config::resolve_token(profile, profile_name)?,
    };

    // 3. Timeout (flag > profile > defaults)
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );

    let session = SessionConfig::new(token)
        .with_base_url(base_url)
        .with_timeout(timeout)
        .with_user_agent(
            profile
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
        );

    // One-shot commands never refresh in the background.
    Ok(ClientConfig::new(session).with_sync(SyncOptions {
        rollback: profile.rollback,
        refresh_interval_secs: 0,
    }))
}
