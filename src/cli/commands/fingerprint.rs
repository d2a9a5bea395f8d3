//! Fingerprint command implementation
//!
//! Implements `elide-lock fingerprint` to fingerprint files the way
//! lockfile inputs are fingerprinted.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::output::{create_file_bar, status};
use crate::core::codec::reduced_hash;
use crate::core::fingerprint::Fingerprint;
use crate::core::lockfile::Version;
use crate::core::settings::LockfileSettings;
use crate::infra::fingerprint::{fingerprint_files, ProgressCallback};

/// Execute the fingerprint command
///
/// `digest` overrides the project settings when given.
pub async fn execute(
    root: &Path,
    paths: Vec<PathBuf>,
    digest: Option<bool>,
    quiet: bool,
) -> Result<()> {
    let settings = LockfileSettings::load(root)?;
    let digest = digest.unwrap_or_else(|| settings.digest());
    let version = Version::latest();
    tracing::info!(
        "Fingerprinting {} files by {}",
        paths.len(),
        if digest { "content digest" } else { "file state" }
    );

    let bar = create_file_bar(paths.len() as u64, quiet);
    let progress: ProgressCallback = {
        let bar = bar.clone();
        Box::new(move |done, _total| bar.set_position(done as u64))
    };
    let results = fingerprint_files(paths, digest, settings.parallelism(), Some(progress))
        .await
        .context("Failed to fingerprint files")?;
    bar.finish_and_clear();

    for (path, fingerprint) in &results {
        println!(
            "{}  {}  {:>11}  {}",
            fingerprint.kind(),
            fingerprint.to_hex(),
            reduced_hash(fingerprint, version),
            path.display()
        );
    }

    let compound: Fingerprint = results.into_iter().map(|(_, fp)| fp).collect();
    if !quiet {
        println!(
            "{} Compound {} (hash {})",
            status::SUCCESS,
            compound.to_hex(),
            reduced_hash(&compound, version)
        );
    }
    Ok(())
}
