//! Light command handlers.

use serde::Serialize;
use tabled::Tabled;

use glowkit_core::{Client, Color, Light, StateChange, Target};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand, PowerState, TargetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Connected")]
    connected: String,
}

impl LightRow {
    fn new(l: &Light, color: bool) -> Self {
        Self {
            id: l.id.clone(),
            label: l.label.clone(),
            power: output::power_label(l.power, color),
            brightness: format!("{:.0}%", l.brightness * 100.0),
            color: l.color.to_string(),
            group: l.group.as_ref().map(|g| g.name.clone()).unwrap_or_default(),
            location: l
                .location
                .as_ref()
                .map(|loc| loc.name.clone())
                .unwrap_or_default(),
            connected: output::connected_label(l.connected, color),
        }
    }
}

/// A group or location as seen through its member lights.
#[derive(Serialize)]
struct Collection {
    id: String,
    name: String,
    selector: String,
    lights: usize,
    power: bool,
}

#[derive(Tabled)]
struct CollectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: usize,
    #[tabled(rename = "Power")]
    power: String,
}

fn collections(targets: &[Target], name_of: impl Fn(&Light) -> Option<String>) -> Vec<Collection> {
    targets
        .iter()
        .map(|t| {
            let lights = t.lights();
            Collection {
                id: t.selector().value().to_owned(),
                name: lights.first().and_then(&name_of).unwrap_or_default(),
                selector: t.selector().to_wire(),
                lights: lights.len(),
                power: t.power(),
            }
        })
        .collect()
}

fn print_collections(items: &[Collection], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        items,
        |c| CollectionRow {
            id: c.id.clone(),
            name: c.name.clone(),
            lights: c.lights,
            power: output::power_label(c.power, color),
        },
        |c| c.selector.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn resolve_target(client: &Client, target: &TargetArgs) -> Result<Target, CliError> {
    let selector = util::parse_selector(&target.selector.selector)?;
    let target = client.target(selector);
    if target.is_empty() {
        tracing::warn!(selector = %target.selector(), "selector matches no known lights");
    }
    Ok(target)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &Client, args: LightsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LightsCommand::List(sel) => {
            let lights = client.target(util::parse_selector(&sel.selector)?).lights();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &lights,
                |l| LightRow::new(l, color),
                |l| l.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightsCommand::Groups(sel) => {
            let targets = client
                .target(util::parse_selector(&sel.selector)?)
                .to_group_targets();
            let items = collections(&targets, |l| l.group.as_ref().map(|g| g.name.clone()));
            print_collections(&items, global);
            Ok(())
        }

        LightsCommand::Locations(sel) => {
            let targets = client
                .target(util::parse_selector(&sel.selector)?)
                .to_location_targets();
            let items = collections(&targets, |l| l.location.as_ref().map(|loc| loc.name.clone()));
            print_collections(&items, global);
            Ok(())
        }

        LightsCommand::Power { state, target } => {
            let duration = util::parse_duration(target.duration)?;
            let on = matches!(state, PowerState::On);
            let handle = resolve_target(client, &target)?.set_power(on, duration);
            util::report(handle, global).await
        }

        LightsCommand::Color {
            kelvin,
            hue,
            saturation,
            target,
        } => {
            let duration = util::parse_duration(target.duration)?;
            let color = match (kelvin, hue, saturation) {
                (Some(k), _, _) => Color::white(k),
                (None, Some(h), Some(s)) => {
                    if !(0.0..=Color::MAX_HUE).contains(&h) {
                        return Err(CliError::Validation {
                            field: "hue".into(),
                            reason: format!("must be between 0 and 360, got {h}"),
                        });
                    }
                    Color::hue_saturation(h, util::unit_interval("saturation", s)?)
                }
                _ => {
                    return Err(CliError::Validation {
                        field: "color".into(),
                        reason: "pass --kelvin, or --hue with --saturation".into(),
                    });
                }
            };
            let handle = resolve_target(client, &target)?.set_color(color, duration);
            util::report(handle, global).await
        }

        LightsCommand::Brightness { level, target } => {
            let duration = util::parse_duration(target.duration)?;
            let change = StateChange::brightness(util::unit_interval("brightness", level)?);
            let handle = resolve_target(client, &target)?.set_state(change, duration);
            util::report(handle, global).await
        }
    }
}
