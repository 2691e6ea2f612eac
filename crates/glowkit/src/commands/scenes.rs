//! Scene command handlers.

use tabled::Tabled;

use glowkit_core::{Client, Scene, Selector};

use crate::cli::{GlobalOpts, ScenesArgs, ScenesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "States")]
    states: usize,
}

impl From<&Scene> for SceneRow {
    fn from(s: &Scene) -> Self {
        Self {
            uuid: s.uuid.clone(),
            name: s.name.clone(),
            states: s.states.len(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &Client, args: ScenesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ScenesCommand::List => {
            let scenes = client.scenes();
            let out = output::render_list(
                &global.output,
                scenes.as_slice(),
                |s| SceneRow::from(s),
                |s| s.uuid.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScenesCommand::Activate { uuid, duration } => {
            let duration = util::parse_duration(duration)?;
            let handle = client.target(Selector::scene(uuid)).activate(duration);
            util::report(handle, global).await
        }

        ScenesCommand::Restore { uuid, duration } => {
            let duration = util::parse_duration(duration)?;
            let handle = client.target(Selector::scene(uuid)).restore_state(duration);
            util::report(handle, global).await
        }
    }
}
