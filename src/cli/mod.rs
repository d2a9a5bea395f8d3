//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no lockfile logic; that belongs in [`crate::core`] and
//! [`crate::infra`].

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use commands::Commands;

/// Inspect and maintain Elide project lockfiles
#[derive(Parser, Debug)]
#[command(name = "elide-lock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and requested data
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "ELIDE_PROJECT_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            let root = match self.root {
                Some(root) => root,
                None => std::env::current_dir()?,
            };
            cmd.run(&root, self.quiet).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
