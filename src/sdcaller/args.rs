use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sdcaller", version)]
#[command(about = "Practice tracker for square-dance callers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create your caller profile
    #[command(alias = "n")]
    Create {
        /// Display name (1-20 letters, digits, spaces, '-' or '_')
        name: String,
    },

    /// Show your profile and practice statistics
    #[command(alias = "s")]
    Show,

    /// Change your display name
    Rename { name: String },

    /// Record a practice session
    #[command(alias = "r")]
    Record {
        /// Calls made during the session
        #[arg(short, long, default_value_t = 0)]
        calls: u64,

        /// Sequences that resolved successfully
        #[arg(short, long, default_value_t = 0)]
        successful: u64,

        /// Sequences that broke down
        #[arg(short, long, default_value_t = 0)]
        failed: u64,
    },

    /// Show or change preferences
    Prefs {
        /// Play call animations automatically
        #[arg(long)]
        auto_play: Option<bool>,

        /// Show flow hints between calls
        #[arg(long)]
        flow_hints: Option<bool>,

        /// Forget stored preferences and use the defaults
        #[arg(long, conflicts_with_all = ["auto_play", "flow_hints"])]
        reset: bool,
    },

    /// Export a backup file
    Export {
        /// Directory to write the backup to
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the backup to stdout instead of writing a file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },

    /// Restore a backup file, replacing the current profile
    Import {
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove all stored data
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check storage and stored data
    Doctor,

    /// Get or set configuration
    Config {
        /// Configuration key (backup-prefix, backup-dir)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
