//! Clap derive structures for the `hue` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hue -- pair with, inspect, and follow a Philips Hue bridge
#[derive(Debug, Parser)]
#[command(
    name = "hue",
    version,
    about = "Control and mirror Philips Hue bridges from the command line",
    long_about = "Pair with a Hue bridge, list and update its resources over the\n\
        CLIP v2 API, and follow live changes on the event stream.",
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
    /// Bridge profile to use
    #[arg(long, short = 'p', env = "HUE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Bridge address or URL (overrides profile)
    #[arg(long, short = 'b', env = "HUE_BRIDGE", global = true)]
    pub bridge: Option<String>,

    /// Application key (overrides profile)
    #[arg(long, env = "HUE_APP_KEY", global = true, hide_env = true)]
    pub app_key: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HUE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HUE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept the bridge's self-signed TLS certificate
    #[arg(long, short = 'k', env = "HUE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HUE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain an application key (press the link button first)
    Pair(PairArgs),

    /// List and inspect bridge resources
    #[command(alias = "res", alias = "r")]
    Resources(ResourcesArgs),

    /// Send a partial update to one resource
    #[command(alias = "set")]
    Update(UpdateArgs),

    /// Mirror the bridge and print resources as they change
    Watch(WatchArgs),

    /// Run a local fake bridge over plain HTTP
    Emulate(EmulateArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Pair ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Device type label registered with the bridge ("app#device")
    #[arg(long, default_value = "huesync#cli")]
    pub device_type: String,

    /// Store the new key in the active profile
    #[arg(long)]
    pub save: bool,
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourcesCommand {
    /// List resources
    #[command(alias = "ls")]
    List {
        /// Only resources of this type (e.g. light, zone)
        #[arg(long = "type", short = 't')]
        rtype: Option<String>,
    },

    /// Show one resource by id
    Get {
        /// Resource id
        id: String,
    },
}

// ── Update ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Resource type (e.g. light, grouped_light)
    pub rtype: String,

    /// Resource id
    pub id: String,

    /// Switch on
    #[arg(long, conflicts_with = "off")]
    pub on: bool,

    /// Switch off
    #[arg(long)]
    pub off: bool,

    /// Brightness percentage (0-100)
    #[arg(long, value_parser = parse_brightness)]
    pub brightness: Option<f64>,

    /// CIE xy color, e.g. "0.31,0.33"
    #[arg(long, value_parser = parse_xy)]
    pub xy: Option<(f64, f64)>,

    /// Transition duration in milliseconds
    #[arg(long)]
    pub transition: Option<i64>,

    /// Rename the resource
    #[arg(long)]
    pub name: Option<String>,

    /// Read the patch body from a JSON file instead of flags
    #[arg(long, short = 'F', conflicts_with_all = ["on", "off", "brightness", "xy", "transition", "name"])]
    pub from_file: Option<PathBuf>,
}

fn parse_brightness(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err("brightness must be between 0 and 100".into())
    }
}

fn parse_xy(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| "expected two comma-separated numbers".to_string())?;
    let x: f64 = x.trim().parse().map_err(|_| format!("'{x}' is not a number"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("'{y}' is not a number"))?;
    Ok((x, y))
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only report resources of this type
    #[arg(long = "type", short = 't')]
    pub rtype: Option<String>,

    /// Exit after printing this many changed resources
    #[arg(long, short = 'n')]
    pub count: Option<u64>,

    /// Print the initial resource list before following changes
    #[arg(long)]
    pub initial: bool,
}

// ── Emulate ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EmulateArgs {
    /// Address to listen on
    #[arg(long, short = 'l', default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Start with the link button already pressed
    #[arg(long)]
    pub press_button: bool,

    /// JSON file with an array of resources to serve
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration
    Show,

    /// Set a value on the active profile (created if missing)
    Set {
        /// Key: bridge, app_key, app_key_env, client_key, ca_cert, insecure, timeout
        key: String,
        /// Value
        value: String,
    },

    /// List profiles (* marks the default)
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
