//! Clap derive structures for the `acogo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// acogo -- drive acoGO! gates and I/O modules from the command line
#[derive(Debug, Parser)]
#[command(
    name = "acogo",
    version,
    about = "Control acoGO! gates and I/O modules from the command line",
    long_about = "A CLI for the acoGO! cloud API.\n\n\
        Lists account devices, opens gates, reads and switches I/O module\n\
        ports, and watches entity state with live polling.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "ACOGO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "ACOGO_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "ACOGO_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ACOGO_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ACOGO_TIMEOUT", global = true)]
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
    /// List devices on the account
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Open gates and inspect their state
    #[command(alias = "g")]
    Gate(GateArgs),

    /// Read and switch I/O module ports
    Io(IoArgs),

    /// List entities (buttons, covers, binary sensors)
    #[command(alias = "ent")]
    Entities(EntitiesArgs),

    /// Poll devices and print entity state changes until Ctrl-C
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GateArgs {
    #[command(subcommand)]
    pub command: GateCommand,
}

#[derive(Debug, Subcommand)]
pub enum GateCommand {
    /// Send the open order to a gate
    Open {
        /// Gate device ID
        device: String,
    },

    /// Show the latest gate details
    Status {
        /// Gate device ID
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IoArgs {
    #[command(subcommand)]
    pub command: IoCommand,
}

#[derive(Debug, Subcommand)]
pub enum IoCommand {
    /// Show input and output levels
    State {
        /// I/O module device ID
        device: String,
    },

    /// Show the raw port configuration (names, pulse times)
    Details {
        /// I/O module device ID
        device: String,
    },

    /// Switch an output on or off
    Set {
        /// I/O module device ID
        device: String,

        /// Output port (1-4)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        port: u8,

        /// Target level
        state: OutputLevel,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputLevel {
    On,
    Off,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES / WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only show entities of this platform
    #[arg(long)]
    pub platform: Option<PlatformArg>,

    /// Which I/O ports become entities (overrides profile)
    #[arg(long)]
    pub port_filter: Option<PortFilterArg>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Gate poll interval in seconds (overrides profile)
    #[arg(long)]
    pub gate_interval: Option<u64>,

    /// I/O poll interval in seconds (overrides profile)
    #[arg(long)]
    pub io_interval: Option<u64>,

    /// Which I/O ports become entities (overrides profile)
    #[arg(long)]
    pub port_filter: Option<PortFilterArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Button,
    Cover,
    BinarySensor,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PortFilterArg {
    /// Every port when details are empty, otherwise described ports only
    DescribedOrUnknown,
    /// Every port
    All,
    /// Only ports with a name or pulse time
    DescribedOnly,
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
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (api_base, token_env, timeout, gate_interval, io_interval, port_filter)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
