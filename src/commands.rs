use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "breach-lens")]
#[command(about = "Breach incident analytics for the dashboard charts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load every configured source and render all chart slots
    Run {
        /// Emit one JSON document per chart slot instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Print the category assigned to a breach method string
    Categorize {
        /// Free-text breach method, e.g. "hacked"
        text: String,
    },
    /// Print configuration values
    PrintConfig,
    /// Display the number of keys in the source cache
    CountCache,
    /// Remove every entry from the source cache
    ClearCache {
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
    },
}
