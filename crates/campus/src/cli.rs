//! Clap derive structures for the `campus` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// campus -- administration console for campus facilities
#[derive(Debug, Parser)]
#[command(
    name = "campus",
    version,
    about = "Administer campus facilities from the command line",
    long_about = "Control classroom air conditioning in real time and manage\n\
        academic activities, the image gallery, and class notifications.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "CAMPUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Document backend URL (overrides profile)
    #[arg(long, short = 'b', env = "CAMPUS_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Realtime database URL (overrides profile)
    #[arg(long, short = 'r', env = "CAMPUS_REALTIME", global = true)]
    pub realtime: Option<String>,

    /// Realtime database secret
    #[arg(long, env = "CAMPUS_REALTIME_SECRET", global = true, hide_env = true)]
    pub realtime_secret: Option<String>,

    /// Use an in-process device store instead of the realtime database
    #[arg(long, global = true)]
    pub demo: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMPUS_OUTPUT",
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

    /// Request timeout in seconds
    #[arg(long, env = "CAMPUS_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,

    /// AC toggle write timeout in seconds (overrides profile)
    #[arg(long, global = true)]
    pub write_timeout: Option<u64>,
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
    /// Control classroom air conditioning
    #[command(alias = "aircon")]
    Ac(AcArgs),

    /// Manage academic activities
    #[command(alias = "act")]
    Activities(ActivitiesArgs),

    /// Manage the image gallery
    #[command(alias = "img")]
    Images(ImagesArgs),

    /// Send and manage class notifications
    Notify(NotifyArgs),

    /// Wake the document backend and check it responds
    Ping,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── AC ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AcArgs {
    /// Seconds to wait for the initial device state
    #[arg(long, default_value = "10")]
    pub wait: u64,

    #[command(subcommand)]
    pub command: AcCommand,
}

#[derive(Debug, Subcommand)]
pub enum AcCommand {
    /// Show power state per room, or per unit for one room
    #[command(alias = "ls")]
    Status {
        /// Room (group) to show unit by unit
        room: Option<String>,
    },

    /// Switch a unit (ROOM/UNIT) or a whole room (ROOM) on
    On {
        /// ROOM or ROOM/UNIT
        target: String,
    },

    /// Switch a unit (ROOM/UNIT) or a whole room (ROOM) off
    Off {
        /// ROOM or ROOM/UNIT
        target: String,
    },

    /// Flip one unit to the opposite of its current state
    Toggle {
        /// ROOM/UNIT
        target: String,
    },

    /// Stream room summaries as they change (Ctrl-C to stop)
    Watch,
}

// ── Activities ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActivitiesArgs {
    #[command(subcommand)]
    pub command: ActivitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ActivitiesCommand {
    /// List activities grouped by academic year
    #[command(alias = "ls")]
    List {
        /// Match name or description (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only this academic year (1-4)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        year: Option<u8>,
    },

    /// Create an activity
    Add {
        /// Activity name
        #[arg(long)]
        name: String,

        /// Academic year (1-4)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        year: u8,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD); defaults to the start date
        #[arg(long)]
        end: Option<String>,

        /// Description
        #[arg(long, short = 'd')]
        description: String,
    },

    /// Delete an activity
    #[command(alias = "rm")]
    Delete {
        /// Activity ID
        id: String,
    },

    /// Import activities from an academic calendar PDF
    Import {
        /// Path to the PDF
        file: PathBuf,

        /// Print the text the backend extracted
        #[arg(long)]
        show_text: bool,
    },
}

// ── Images ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ImagesArgs {
    #[command(subcommand)]
    pub command: ImagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ImagesCommand {
    /// List gallery images
    #[command(alias = "ls")]
    List {
        /// Match image name (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Add an image from a local file or an existing URL
    #[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Local image to upload to the media host
        #[arg(long)]
        file: Option<PathBuf>,

        /// Already-hosted image URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Delete an image
    #[command(alias = "rm")]
    Delete {
        /// Image ID
        id: String,
    },
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotifyArgs {
    #[command(subcommand)]
    pub command: NotifyCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotifyCommand {
    /// Send a notification to a class section
    Send {
        /// Receiving class: 1-a, 1-b, .. 4-b
        #[arg(long, short = 't')]
        to: String,

        /// Message text
        #[arg(long, short = 'm')]
        message: String,

        /// Sender name (default: HOD)
        #[arg(long)]
        from: Option<String>,

        /// File to attach (uploaded to the media host first)
        #[arg(long, short = 'a')]
        attach: Option<PathBuf>,
    },

    /// List sent notifications
    #[command(alias = "ls")]
    List {
        /// Only notifications for this class
        #[arg(long, short = 't')]
        to: Option<String>,
    },

    /// Delete a notification
    #[command(alias = "rm")]
    Delete {
        /// Notification ID
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration (secrets masked)
    Show,

    /// Set a profile key
    Set {
        /// Key (backend, realtime, realtime_secret_env, media_url, media_preset,
        /// media_folder, timeout, write_timeout)
        key: String,
        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store the realtime database secret in the system keyring
    SetSecret {
        /// Profile name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
