//! Input materials
//!
//! An [`InputMaterial`] is one tracked ingredient (a dependency manifest or a
//! foreign lockfile) that fed a stanza's fingerprint.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fingerprint::Fingerprint;

/// Dependency ecosystems a manifest can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Maven Central or a Maven-style repository
    Maven,
    /// NPM or an NPM-style registry
    Npm,
    /// JSR
    Jsr,
    /// PyPI or a PyPI-style index
    #[serde(rename = "pypi")]
    PyPi,
    /// RubyGems
    #[serde(rename = "rubygems")]
    RubyGems,
    /// HuggingFace
    #[serde(rename = "huggingface")]
    HuggingFace,
    /// Git repositories
    Git,
}

impl Ecosystem {
    /// Stable wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Jsr => "jsr",
            Self::PyPi => "pypi",
            Self::RubyGems => "rubygems",
            Self::HuggingFace => "huggingface",
            Self::Git => "git",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Maven,
            Self::Npm,
            Self::Jsr,
            Self::PyPi,
            Self::RubyGems,
            Self::HuggingFace,
            Self::Git,
        ]
        .into_iter()
        .find(|e| e.as_str() == name)
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text remarks attached to a stanza or input
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Remarks {
    /// Remark text
    pub message: String,
}

impl Remarks {
    /// Create remarks
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Remarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A single tracked input
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputMaterial {
    /// A dependency-declaration file
    DependencyManifest {
        /// Ecosystem the manifest belongs to
        ecosystem: Ecosystem,
        /// Relative path or logical name
        identifier: String,
        /// Content fingerprint
        fingerprint: Fingerprint,
        /// Optional remarks
        remarks: Option<Remarks>,
    },

    /// A lockfile produced by another tool, tracked as an input
    PeerLockfile {
        /// Name of the tool that owns the lockfile format
        tool: String,
        /// Relative path or logical name
        identifier: String,
        /// Content fingerprint
        fingerprint: Fingerprint,
        /// Optional remarks
        remarks: Option<Remarks>,
    },
}

impl InputMaterial {
    /// Track a dependency manifest
    pub fn dependency_manifest(
        ecosystem: Ecosystem,
        identifier: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> Self {
        Self::DependencyManifest {
            ecosystem,
            identifier: identifier.into(),
            fingerprint,
            remarks: None,
        }
    }

    /// Track a foreign lockfile
    pub fn peer_lockfile(
        tool: impl Into<String>,
        identifier: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> Self {
        Self::PeerLockfile {
            tool: tool.into(),
            identifier: identifier.into(),
            fingerprint,
            remarks: None,
        }
    }

    /// Attach remarks
    #[must_use]
    pub fn with_remarks(mut self, message: impl Into<String>) -> Self {
        match &mut self {
            Self::DependencyManifest { remarks, .. } | Self::PeerLockfile { remarks, .. } => {
                *remarks = Some(Remarks::new(message));
            }
        }
        self
    }

    /// Unique key of this input
    pub fn identifier(&self) -> &str {
        match self {
            Self::DependencyManifest { identifier, .. } | Self::PeerLockfile { identifier, .. } => {
                identifier
            }
        }
    }

    /// Relative path of the file; same as [`Self::identifier`]
    pub fn relative_path(&self) -> &str {
        self.identifier()
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::DependencyManifest { fingerprint, .. }
            | Self::PeerLockfile { fingerprint, .. } => fingerprint,
        }
    }

    /// Remarks, if any
    pub fn remarks(&self) -> Option<&Remarks> {
        match self {
            Self::DependencyManifest { remarks, .. } | Self::PeerLockfile { remarks, .. } => {
                remarks.as_ref()
            }
        }
    }
}
