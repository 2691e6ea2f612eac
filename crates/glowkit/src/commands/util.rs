//! Shared helpers for command handlers.

use std::time::Duration;

use tabled::Tabled;

use glowkit_core::{CommandHandle, OperationResult, OperationStatus, Selector};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Parse a selector argument.
pub fn parse_selector(raw: &str) -> Result<Selector, CliError> {
    raw.parse().map_err(|e: glowkit_core::SelectorParseError| CliError::Validation {
        field: "selector".into(),
        reason: e.to_string(),
    })
}

/// Parse a transition time in seconds.
pub fn parse_duration(secs: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(secs).map_err(|_| CliError::Validation {
        field: "duration".into(),
        reason: format!("expected a non-negative number of seconds, got {secs}"),
    })
}

/// Check that a 0-1 fraction is in range.
pub fn unit_interval(field: &str, value: f64) -> Result<f64, CliError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: format!("must be between 0 and 1, got {value}"),
        })
    }
}

// ── Command results ─────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Light")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Await a command and print its per-light results.
pub async fn report(handle: CommandHandle, global: &GlobalOpts) -> Result<(), CliError> {
    let results = handle.await?;
    let out = output::render_list(
        &global.output,
        &results,
        |r: &OperationResult| ResultRow {
            id: r.id.clone(),
            status: r.status.to_string(),
        },
        |r| format!("{} {}", r.id, r.status),
    );
    output::print_output(&out, global.quiet);

    let failed = results
        .iter()
        .filter(|r| r.status != OperationStatus::Ok)
        .count();
    if failed > 0 && !global.quiet {
        eprintln!("{failed} of {} lights did not confirm the change", results.len());
    }
    Ok(())
}
