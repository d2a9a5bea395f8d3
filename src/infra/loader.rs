//! Lockfile discovery and loading
//!
//! Lockfiles live under `<root>/.dev/`. Discovery tries a fixed list of
//! candidates and loads the first one that exists:
//!
//! 1. `elide.lock.bin` (binary)
//! 2. `elide.lock.json` (JSON)
//! 3. `elide.lock` (format sniffed from content)

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::filesystem;
use crate::core::codec::LockfileDefinition;
use crate::core::lockfile::{Format, Lockfile, Version};
use crate::error::{FilesystemError, LockfileError};

/// Candidate formats, in discovery order
pub const CANDIDATE_FORMATS: [Format; 3] = [Format::Binary, Format::Json, Format::Auto];

/// Candidate lockfile paths under a project root, in discovery order
pub fn lockfile_candidates(root: &Path) -> Vec<(PathBuf, Format)> {
    CANDIDATE_FORMATS
        .iter()
        .map(|format| (format.path_under(root), *format))
        .collect()
}

/// A lockfile loaded from disk, with where and how it was loaded
///
/// Dereferences to the decoded [`Lockfile`].
#[derive(Debug, Clone)]
pub struct InterpretedLockfile {
    lockfile: Lockfile,
    path: PathBuf,
    root: PathBuf,
    format: Format,
    definition: Arc<dyn LockfileDefinition>,
    duration: Option<Duration>,
}

impl InterpretedLockfile {
    /// The decoded lockfile
    pub fn lockfile(&self) -> &Lockfile {
        &self.lockfile
    }

    /// Unwrap the decoded lockfile
    pub fn into_lockfile(self) -> Lockfile {
        self.lockfile
    }

    /// File the lockfile was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Format the file was decoded as
    pub fn format(&self) -> Format {
        self.format
    }

    /// Definition used to decode
    pub fn definition(&self) -> &Arc<dyn LockfileDefinition> {
        &self.definition
    }

    /// Time taken to read and decode, if measured
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Replace the lockfile content without touching disk
    ///
    /// Keeps the path, root, format, and definition.
    #[must_use]
    pub fn update_to(
        &self,
        duration: Option<Duration>,
        supplier: impl FnOnce() -> Lockfile,
    ) -> Self {
        Self {
            lockfile: supplier(),
            path: self.path.clone(),
            root: self.root.clone(),
            format: self.format,
            definition: Arc::clone(&self.definition),
            duration,
        }
    }
}

impl Deref for InterpretedLockfile {
    type Target = Lockfile;

    fn deref(&self) -> &Self::Target {
        &self.lockfile
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf, LockfileError> {
    match root {
        Some(root) => Ok(root.to_path_buf()),
        None => std::env::current_dir().map_err(|source| {
            LockfileError::Filesystem(FilesystemError::ReadFile {
                path: PathBuf::from("."),
                source,
            })
        }),
    }
}

/// First candidate that exists
///
/// Only a missing file counts as absent; any other I/O error is returned.
async fn find_lockfile(root: &Path) -> Result<Option<(PathBuf, Format)>, LockfileError> {
    for (path, format) in lockfile_candidates(root) {
        tracing::debug!("Checking for lockfile at {}", path.display());
        let exists = tokio::fs::try_exists(&path).await.map_err(|source| {
            LockfileError::Filesystem(FilesystemError::ReadFile {
                path: path.clone(),
                source,
            })
        })?;
        if exists {
            return Ok(Some((path, format)));
        }
    }
    Ok(None)
}

async fn read_lockfile(
    root: PathBuf,
    path: PathBuf,
    format: Format,
    definition: Arc<dyn LockfileDefinition>,
) -> Result<InterpretedLockfile, LockfileError> {
    let reader = Arc::clone(&definition);
    let source = path.clone();
    let (lockfile, format, duration) = tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let bytes = filesystem::read_bytes(&source)?;
        let format = match format {
            Format::Auto => Format::sniff(&bytes),
            other => other,
        };
        let lockfile = reader.read_from(format, &mut bytes.as_slice())?;
        Ok::<_, LockfileError>((lockfile, format, started.elapsed()))
    })
    .await
    .map_err(|e| LockfileError::Task(e.to_string()))??;

    tracing::info!(
        "Loaded {format} lockfile from {} in {:?}",
        path.display(),
        duration
    );
    Ok(InterpretedLockfile {
        lockfile,
        path,
        root,
        format,
        definition,
        duration: Some(duration),
    })
}

/// Load the project's lockfile, failing if there is none
///
/// `root` defaults to the working directory; `definition` defaults to the
/// latest version's.
pub async fn load_lockfile(
    root: Option<&Path>,
    definition: Option<Arc<dyn LockfileDefinition>>,
) -> Result<InterpretedLockfile, LockfileError> {
    let root = resolve_root(root)?;
    match find_lockfile(&root).await? {
        Some((path, format)) => {
            let definition = definition.unwrap_or_else(|| Version::latest().definition());
            read_lockfile(root, path, format, definition).await
        }
        None => Err(LockfileError::NotFound {
            candidates: lockfile_candidates(&root)
                .into_iter()
                .map(|(path, _)| path)
                .collect(),
            root,
        }),
    }
}

/// Load the project's lockfile, returning `None` if there is none
pub async fn load_lockfile_safe(
    root: Option<&Path>,
    definition: Option<Arc<dyn LockfileDefinition>>,
) -> Result<Option<InterpretedLockfile>, LockfileError> {
    match load_lockfile(root, definition).await {
        Ok(loaded) => Ok(Some(loaded)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write a lockfile to its canonical path for `format`
///
/// [`Format::Auto`] resolves to the definition's default format. Returns the
/// path written.
pub async fn write_lockfile(
    root: &Path,
    lockfile: Lockfile,
    format: Format,
    definition: Arc<dyn LockfileDefinition>,
) -> Result<PathBuf, LockfileError> {
    let format = definition.version().resolve_format(format);
    let path = format.path_under(root);
    let target = path.clone();

    tokio::task::spawn_blocking(move || {
        let mut bytes = Vec::new();
        definition.write_to(format, &lockfile, &mut bytes)?;
        filesystem::write_bytes(&target, &bytes)?;
        Ok::<_, LockfileError>(())
    })
    .await
    .map_err(|e| LockfileError::Task(e.to_string()))??;

    tracing::info!("Wrote {format} lockfile to {}", path.display());
    Ok(path)
}
