use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hatim", version, author, about = "Track your juz and hatim completions from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark a juz as read
    Mark {
        /// Juz number (1-30)
        juz: u32,
    },
    /// Mark a juz as not read
    Unmark {
        /// Juz number (1-30)
        juz: u32,
    },
    /// Show your progress and personal statistics
    Progress,
    /// Show community statistics and recent hatims
    Stats,
    /// Leaderboard and totals (requires the configured passphrase)
    Admin {
        #[arg(long)]
        passphrase: String,
    },
    /// Set your display name
    Name {
        /// Name shown on the leaderboard
        name: String,
    },
    /// Show this device's identity
    Whoami,
    /// Print your progress as JSON
    Export,
}
