//! Error types for elide-lockfile
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::lockfile::Format;

/// Boxed underlying cause carried by codec errors
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write file
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read file
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fingerprint computation errors
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// File does not exist
    #[error("Cannot fingerprint '{path}': file not found")]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Cannot fingerprint '{path}': not a regular file")]
    NotAFile { path: PathBuf },

    /// IO error while reading metadata or content
    #[error("IO error fingerprinting '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Hash algorithm name not recognized
    #[error("Unknown hash algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    /// Blocking task failed or was cancelled
    #[error("Fingerprint task failed: {0}")]
    Task(String),
}

/// Lockfile codec, discovery, and assembly errors
#[derive(Error, Debug)]
pub enum LockfileError {
    /// Failed to decode a lockfile stream
    #[error("Failed to read {format} lockfile: {source}")]
    Read {
        format: Format,
        #[source]
        source: BoxedCause,
    },

    /// Failed to encode a lockfile stream
    #[error("Failed to write {format} lockfile: {source}")]
    Write {
        format: Format,
        #[source]
        source: BoxedCause,
    },

    /// Version label not present in the version registry
    #[error("Unsupported lockfile version '{label}'")]
    UnsupportedVersion { label: String },

    /// Version label known, but not the one this definition handles
    #[error("Lockfile version mismatch: expected '{expected}', found '{found}'")]
    VersionMismatch { expected: String, found: String },

    /// No lockfile at any candidate path
    #[error("No lockfile found under '{}' (tried: {})", root.display(), format_candidates(candidates))]
    NotFound {
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Fingerprint error
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// A contributor failed to produce its stanza
    #[error("Lockfile contributor '{name}' failed: {error}")]
    Contributor { name: String, error: String },

    /// Blocking task failed or was cancelled
    #[error("Lockfile task failed: {0}")]
    Task(String),
}

impl LockfileError {
    /// Wrap a decode failure
    pub fn read(format: Format, source: impl Into<BoxedCause>) -> Self {
        Self::Read {
            format,
            source: source.into(),
        }
    }

    /// Wrap an encode failure
    pub fn write(format: Format, source: impl Into<BoxedCause>) -> Self {
        Self::Write {
            format,
            source: source.into(),
        }
    }

    /// Whether this error means "no lockfile exists"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}
