//! Lockfile settings
//!
//! Reads per-project settings from `.dev/lockfile.toml`. A missing file
//! yields defaults; an invalid file is an error.
//!
//! ```toml
//! [lockfile]
//! format = "json"
//! digest = false
//! fingerprints = "hash"
//! parallelism = 4
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::codec::FingerprintMode;
use super::lockfile::{Format, Version};
use crate::config::defaults;
use crate::error::SettingsError;

/// Project lockfile settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockfileSettings {
    /// Lockfile options
    #[serde(default)]
    pub lockfile: LockfileSection,
}

/// The `[lockfile]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockfileSection {
    /// Format to write new lockfiles in
    pub format: Option<Format>,

    /// Fingerprint files by content digest (true) or metadata (false)
    pub digest: Option<bool>,

    /// Scalar written for each fingerprint
    pub fingerprints: Option<FingerprintMode>,

    /// Files fingerprinted concurrently
    pub parallelism: Option<usize>,
}

impl LockfileSettings {
    /// Path of the settings file under a project root
    pub fn path_under(root: &Path) -> PathBuf {
        root.join(defaults::LOCKFILE_DIR).join(defaults::SETTINGS_FILE)
    }

    /// Load settings for a project root
    pub fn load(root: &Path) -> Result<Self, SettingsError> {
        Self::load_from_path(&Self::path_under(root))
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!("Loaded lockfile settings from {}", path.display());
        Ok(settings)
    }

    /// Effective write format
    ///
    /// Falls back to the latest version's default format.
    #[must_use]
    pub fn format(&self) -> Format {
        Version::latest().resolve_format(self.lockfile.format.unwrap_or(Format::Auto))
    }

    /// Effective file fingerprint strategy
    #[must_use]
    pub fn digest(&self) -> bool {
        self.lockfile
            .digest
            .unwrap_or(defaults::DEFAULT_DIGEST_FILES)
    }

    /// Effective fingerprint scalar
    #[must_use]
    pub fn fingerprints(&self) -> FingerprintMode {
        self.lockfile.fingerprints.unwrap_or_default()
    }

    /// Effective fingerprint parallelism
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.lockfile
            .parallelism
            .filter(|n| *n > 0)
            .unwrap_or_else(defaults::default_parallelism)
    }
}
