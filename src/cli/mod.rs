//! CLI module for Tasker
//!
//! Provides command-line interface parsing for the tasker-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tasker - task management API server
///
/// Serves the task API with password login, signed bearer tokens and
/// role and ownership based access control.
#[derive(Parser, Debug)]
#[command(
    name = "tasker-server",
    version,
    about = "Tasker - task management API server",
    long_about = "Task management API with password login, signed bearer tokens\n\
                  and role and ownership based access control.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  tasker-server init                 # Write tasker.toml and .env.example\n    \
                  tasker-server                      # Start the server with tasker.toml\n    \
                  tasker-server --config my.toml     # Use a custom config file\n    \
                  tasker-server --port 8080          # Override the configured port"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tasker.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Override the configured host address
    #[arg(long, env = "TASKER_HOST")]
    pub host: Option<String>,

    /// Override the configured port
    #[arg(long, env = "TASKER_PORT")]
    pub port: Option<u16>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter tasker.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
