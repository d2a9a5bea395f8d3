//! File fingerprinting
//!
//! Builds [`Fingerprint`]s from files on disk, either from metadata
//! ([`Fingerprint::FileState`]) or from content ([`Fingerprint::FileDigest`]).
//! The synchronous functions block; use the `async` variants from a tokio
//! runtime so the work lands on the blocking pool.

use futures::{StreamExt, TryStreamExt};
use sha1::Sha1;
use sha2::Digest as _;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::core::fingerprint::Fingerprint;
use crate::core::hashing::{self, DigestEncoding, HashAlgorithm};
use crate::error::FingerprintError;

/// Progress callback type for multi-file fingerprinting (`done`, `total`)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

const READ_BUFFER_SIZE: usize = 64 * 1024;

fn io_error(path: &Path, source: std::io::Error) -> FingerprintError {
    if source.kind() == ErrorKind::NotFound {
        FingerprintError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        FingerprintError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn saturating_i64(value: u128) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Fingerprint a file by modification time and size
///
/// Cheap, but misses content changes that preserve both. Fails if the file
/// does not exist.
pub fn of_file_state(path: &Path) -> Result<Fingerprint, FingerprintError> {
    let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
    let modified = metadata.modified().map_err(|e| io_error(path, e))?;
    let last_modified_millis = match modified.duration_since(UNIX_EPOCH) {
        Ok(since) => saturating_i64(since.as_millis()),
        Err(before) => -saturating_i64(before.duration().as_millis()),
    };

    Ok(Fingerprint::FileState {
        last_modified_millis,
        size_bytes: saturating_i64(u128::from(metadata.len())),
    })
}

/// Fingerprint a file by SHA-1 of its content and its size
///
/// Reads the whole file. Fails if the file does not exist.
pub fn of_file_digest(path: &Path) -> Result<Fingerprint, FingerprintError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut size: u64 = 0;

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error(path, e)),
        };
        hasher.update(&buf[..read]);
        size += read as u64;
    }

    let digest = DigestEncoding::Base64.encode(&hasher.finalize());
    Ok(Fingerprint::FileDigest {
        size_bytes: saturating_i64(u128::from(size)),
        content_hash_code: hashing::string_hash_code(&digest),
    })
}

/// Fingerprint a path that may not exist
///
/// Returns [`Fingerprint::NoContent`] for a missing path and fails with
/// [`FingerprintError::NotAFile`] for anything but a regular file.
pub fn for_file(path: &Path, digest: bool) -> Result<Fingerprint, FingerprintError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Fingerprint::NoContent),
        Err(e) => return Err(io_error(path, e)),
    };
    if !metadata.is_file() {
        return Err(FingerprintError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    if digest {
        of_file_digest(path)
    } else {
        of_file_state(path)
    }
}

/// [`for_file`] on the blocking pool
pub async fn for_file_async(path: PathBuf, digest: bool) -> Result<Fingerprint, FingerprintError> {
    tokio::task::spawn_blocking(move || for_file(&path, digest))
        .await
        .map_err(|e| FingerprintError::Task(e.to_string()))?
}

/// Fingerprint many files concurrently
///
/// At most `parallelism` files are read at once. Results come back in the
/// order of `paths`.
pub async fn fingerprint_files(
    paths: Vec<PathBuf>,
    digest: bool,
    parallelism: usize,
    progress: Option<ProgressCallback>,
) -> Result<Vec<(PathBuf, Fingerprint)>, FingerprintError> {
    let total = paths.len();
    let mut done = 0usize;

    futures::stream::iter(paths)
        .map(|path| async move {
            let fingerprint = for_file_async(path.clone(), digest).await?;
            Ok::<_, FingerprintError>((path, fingerprint))
        })
        .buffered(parallelism.max(1))
        .inspect_ok(|_| {
            done += 1;
            if let Some(cb) = &progress {
                cb(done, total);
            }
        })
        .try_collect()
        .await
}

/// Fingerprint of one file within a tree, bound to its relative path
fn tree_entry(relative: &Path, fingerprint: &Fingerprint) -> Fingerprint {
    let path: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    let mut bytes = path.join("/").into_bytes();
    bytes.push(0);
    bytes.extend(fingerprint.as_bytes());
    Fingerprint::of_digest(HashAlgorithm::Sha1, &bytes, None)
}

/// Compound fingerprint of every regular file under `dir`
///
/// Each constituent covers a file's path relative to `dir` as well as its
/// content, so copies and renames change the result. A missing path yields
/// [`Fingerprint::NoContent`]; a regular file yields its own fingerprint.
pub fn fingerprint_tree(dir: &Path, digest: bool) -> Result<Fingerprint, FingerprintError> {
    if !dir.is_dir() {
        return for_file(dir, digest);
    }

    let mut constituents = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| FingerprintError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            constituents.push(tree_entry(relative, &for_file(entry.path(), digest)?));
        }
    }
    tracing::debug!(
        "Fingerprinted {} files under {}",
        constituents.len(),
        dir.display()
    );
    Ok(Fingerprint::compound(constituents))
}
