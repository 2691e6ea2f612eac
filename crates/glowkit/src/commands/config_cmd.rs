//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut masked = cfg.clone();
    for profile in masked.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    masked
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref ua) = p.user_agent {
            let _ = writeln!(out, "user_agent = \"{ua}\"");
        }
        let _ = writeln!(out, "rollback = \"{}\"", rollback_name(p));
        if let Some(secs) = p.refresh_interval_secs {
            let _ = writeln!(out, "refresh_interval_secs = {secs}");
        }
    }

    out
}

fn rollback_name(p: &Profile) -> &'static str {
    match p.rollback {
        glowkit_core::RollbackPolicy::Keep => "keep",
        glowkit_core::RollbackPolicy::Revert => "revert",
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Offer to store the token in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        glowkit_config::store_token(profile_name, token)?;
        eprintln!("   ✓ token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("glow -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Base URL
            let base_url: String = Input::new()
                .with_prompt("API base URL")
                .default(Profile::default().base_url)
                .interact_text()
                .map_err(prompt_err)?;
            let base_url = glowkit_config::validate_base_url(&base_url)?;

            // 3. Token
            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            let token = prompt_token_storage(&token, &profile_name)?;

            // 4. Merge into existing config
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    base_url,
                    token,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: glow lights list");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |c| {
                c.active_profile_name().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}
