//! Convert command implementation
//!
//! Implements `elide-lock convert` to re-encode the lockfile in another
//! format. The original file is removed unless `--keep` is given.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::output::status;
use crate::core::codec::{LockfileCodec, LockfileDefinition};
use crate::core::lockfile::Format;
use crate::core::settings::LockfileSettings;
use crate::infra::filesystem;
use crate::infra::loader::{load_lockfile, write_lockfile};

/// Execute the convert command
pub async fn execute(root: &Path, to: Format, keep: bool, quiet: bool) -> Result<()> {
    let settings = LockfileSettings::load(root)?;
    let loaded = load_lockfile(Some(root), None)
        .await
        .with_context(|| format!("Failed to load lockfile under {}", root.display()))?;

    let version = loaded.version();
    let target = version.resolve_format(to);
    if target.path_under(root) == loaded.path() {
        if !quiet {
            println!(
                "{} Lockfile is already {target} at {}",
                status::SUCCESS,
                loaded.path().display()
            );
        }
        return Ok(());
    }

    let definition: Arc<dyn LockfileDefinition> =
        Arc::new(LockfileCodec::new(version).with_mode(settings.fingerprints()));
    let source = loaded.path().to_path_buf();
    let from = loaded.format();
    let written = write_lockfile(root, loaded.into_lockfile(), target, definition)
        .await
        .with_context(|| format!("Failed to write {target} lockfile"))?;

    if !keep {
        filesystem::remove_file(&source)?;
    }

    if !quiet {
        println!(
            "{} Converted {from} lockfile to {target}: {}",
            status::SUCCESS,
            written.display()
        );
        if keep {
            println!("  Kept {}", source.display());
        } else {
            println!("  Removed {}", source.display());
        }
    }
    Ok(())
}
