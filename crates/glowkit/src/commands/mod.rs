//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod lights;
pub mod scenes;
pub mod util;

use glowkit_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a client-backed command to its handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Lights(args) => lights::handle(client, args, global).await,
        Command::Scenes(args) => scenes::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
