//! Clap derive structures for the `glow` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// glow -- control cloud-connected smart lights from the command line
#[derive(Debug, Parser)]
#[command(
    name = "glow",
    version,
    about = "Control cloud-connected smart lights from the command line",
    long_about = "Inspect and change lights, groups, locations and scenes through\n\
        the cloud lighting HTTP API. Changes are applied to the local view\n\
        immediately and confirmed by the service afterwards.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "GLOWKIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "GLOWKIT_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Access token (overrides profile and keyring)
    #[arg(long, env = "GLOWKIT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GLOWKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GLOWKIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and change lights
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// List, activate and restore scenes
    #[command(alias = "s")]
    Scenes(ScenesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Which lights a command applies to.
#[derive(Debug, Args)]
pub struct SelectorArgs {
    /// Selector: all, id:<id>, group_id:<id>, location_id:<id>, scene_id:<uuid>
    #[arg(long, short = 'S', default_value = "all")]
    pub selector: String,
}

/// Selector plus transition time for mutating commands.
#[derive(Debug, Args)]
pub struct TargetArgs {
    #[command(flatten)]
    pub selector: SelectorArgs,

    /// Transition duration in seconds
    #[arg(long, short = 'd', default_value = "0")]
    pub duration: f64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List lights
    #[command(alias = "ls")]
    List(SelectorArgs),

    /// List groups among the selected lights
    Groups(SelectorArgs),

    /// List locations among the selected lights
    Locations(SelectorArgs),

    /// Turn lights on or off
    Power {
        state: PowerState,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Set color by white temperature or hue and saturation
    Color {
        /// White temperature in kelvin
        #[arg(
            long,
            short = 'k',
            conflicts_with_all = ["hue", "saturation"],
            required_unless_present = "hue"
        )]
        kelvin: Option<i64>,

        /// Hue in degrees (0-360)
        #[arg(long, requires = "saturation")]
        hue: Option<f64>,

        /// Saturation (0-1)
        #[arg(long, requires = "hue")]
        saturation: Option<f64>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Set brightness (0-1)
    Brightness {
        level: f64,

        #[command(flatten)]
        target: TargetArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCENES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScenesArgs {
    #[command(subcommand)]
    pub command: ScenesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScenesCommand {
    /// List scenes
    #[command(alias = "ls")]
    List,

    /// Activate a scene server-side
    Activate {
        /// Scene UUID
        uuid: String,

        /// Transition duration in seconds
        #[arg(long, short = 'd', default_value = "0")]
        duration: f64,
    },

    /// Replay a scene's states one by one
    Restore {
        /// Scene UUID
        uuid: String,

        /// Transition duration in seconds
        #[arg(long, short = 'd', default_value = "0")]
        duration: f64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration (tokens masked)
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
