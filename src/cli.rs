//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linkpulse - URL shortener with per-visit analytics
#[derive(Parser, Debug)]
#[command(name = "linkpulse")]
#[command(version)]
#[command(about = "A URL shortener with per-visit analytics", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ./config.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print a sample config.toml to stdout
    GenerateConfig,

    /// Issue a bearer token for an owner
    Token {
        /// Owner id placed in the token subject
        owner_id: String,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
