//! Command-line interface for levelmine.
//!
//! Uses clap for argument parsing. The hidden `worker` subcommand is the
//! entry point for distributed ranks spawned by `mine --mode distributed`.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod commands;
mod output;

pub use output::Output;

/// Levelmine - level-wise frequent itemset mining
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet output (result lines only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Mine frequent itemsets from a transaction file
    Mine(commands::mine::MineArgs),
    /// Re-run the mine across worker counts and log the timings
    Sweep(commands::sweep::SweepArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Distributed worker rank (spawned by `mine --mode distributed`)
    #[command(hide = true)]
    Worker(commands::worker::WorkerArgs),
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
}

impl Cli {
    /// Route tracing to stderr so result output on stdout stays clean.
    pub fn init_logging(&self) {
        let default_filter = if self.verbose {
            "levelmine=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = Output::new(self.verbose, self.quiet);

        match self.command {
            Some(Commands::Mine(args)) => {
                commands::mine::execute(args, self.config.as_deref(), &output)
            }
            Some(Commands::Sweep(args)) => {
                commands::sweep::execute(args, self.config.as_deref(), &output)
            }
            Some(Commands::Config(cmd)) => {
                commands::config::execute(cmd, self.config.as_deref(), &output)
            }
            Some(Commands::Worker(args)) => commands::worker::execute(args),
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}
