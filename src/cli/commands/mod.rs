//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod convert;
pub mod fingerprint;
pub mod show;

use anyhow::Result;
use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::core::lockfile::Format;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the project's lockfile
    Show {
        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Re-encode the project's lockfile in another format
    Convert {
        /// Target format (json or binary)
        #[arg(long)]
        to: Format,

        /// Keep the original file
        #[arg(long)]
        keep: bool,
    },

    /// Fingerprint files
    Fingerprint {
        /// Fingerprint by content digest
        #[arg(long, conflicts_with = "state")]
        digest: bool,

        /// Fingerprint by modification time and size
        #[arg(long)]
        state: bool,

        /// Files to fingerprint
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

impl Commands {
    /// Execute the command against a project root
    pub async fn run(self, root: &Path, quiet: bool) -> Result<()> {
        match self {
            Self::Show { json } => show::execute(root, json).await,
            Self::Convert { to, keep } => convert::execute(root, to, keep, quiet).await,
            Self::Fingerprint {
                digest,
                state,
                paths,
            } => {
                let digest = match (digest, state) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                fingerprint::execute(root, paths, digest, quiet).await
            }
        }
    }
}
