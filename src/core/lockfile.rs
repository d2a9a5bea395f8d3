//! Lockfile model
//!
//! The lockfile (`.dev/elide.lock.*`) records the fingerprints of every
//! stanza contributed to a project, so later runs can tell whether
//! dependencies need to be resolved again.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::fingerprint::{Fingerprint, FingerprintEncoding};
use super::stanza::{Stanza, TypedState};
use crate::config::defaults;

/// Physical lockfile format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable JSON
    Json,
    /// Compact CBOR with numbered fields
    Binary,
    /// Inferred from the file name or content
    Auto,
}

impl Format {
    /// Canonical file name for this format
    pub fn file_name(self) -> String {
        match self.extension() {
            Some(ext) => format!("{}.{ext}", defaults::LOCKFILE_BASENAME),
            None => defaults::LOCKFILE_BASENAME.to_string(),
        }
    }

    /// File extension for this format
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("json"),
            Self::Binary => Some("bin"),
            Self::Auto => None,
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("bin") => Self::Binary,
            _ => Self::Auto,
        }
    }

    /// Format implied by a stream's leading bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Self::Json,
            _ => Self::Binary,
        }
    }

    /// Path of the lockfile in this format under a project root
    pub fn path_under(self, root: &Path) -> PathBuf {
        root.join(defaults::LOCKFILE_DIR).join(self.file_name())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Binary => write!(f, "binary"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "text" => Ok(Self::Json),
            "binary" | "bin" | "cbor" => Ok(Self::Binary),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown lockfile format '{other}'")),
        }
    }
}

/// Lockfile schema version
///
/// Only the label is written to disk; the ordinal and every other property
/// come from the registry in [`Version::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    /// Monotonic schema number
    pub ordinal: u32,
    /// Wire label
    pub label: &'static str,
    /// Format used when writing with [`Format::Auto`]
    pub default_format: Format,
    /// Whether this version can still be read and written
    pub supported: bool,
    /// Whether this is the version new lockfiles are written with
    pub current: bool,
    /// Byte encoding fingerprints are reduced with
    pub encoding: FingerprintEncoding,
}

impl Version {
    /// First schema: narrow fingerprint encodings
    pub const V1: Self = Self {
        ordinal: 1,
        label: "v1",
        default_format: Format::Json,
        supported: true,
        current: false,
        encoding: FingerprintEncoding::Legacy,
    };

    /// Current schema: full-width fingerprint encodings
    pub const V2: Self = Self {
        ordinal: 2,
        label: "v2",
        default_format: Format::Binary,
        supported: true,
        current: true,
        encoding: FingerprintEncoding::Wide,
    };

    /// Every known version, oldest first
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// The version new lockfiles are written with
    pub fn latest() -> Self {
        Self::V2
    }

    /// Look up a version by its wire label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label == label)
    }

    /// Resolve [`Format::Auto`] to this version's default
    pub fn resolve_format(self, format: Format) -> Format {
        match format {
            Format::Auto => self.default_format,
            other => other,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// A complete lockfile
///
/// Immutable once built; updating means building a new instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Lockfile {
    version: Version,
    fingerprint: Fingerprint,
    stanzas: Vec<Stanza>,
}

impl Lockfile {
    /// Build a lockfile, deriving the overall fingerprint from the stanzas
    ///
    /// Stanzas are kept sorted by identifier. Duplicate identifiers are not
    /// rejected; callers must avoid them.
    pub fn new(version: Version, stanzas: impl IntoIterator<Item = Stanza>) -> Self {
        let mut stanzas: Vec<Stanza> = stanzas.into_iter().collect();
        stanzas.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        for pair in stanzas.windows(2) {
            if pair[0].identifier == pair[1].identifier {
                tracing::warn!("Duplicate lockfile stanza '{}'", pair[0].identifier);
            }
        }
        let fingerprint = Fingerprint::from_stanzas(&stanzas);
        Self {
            version,
            fingerprint,
            stanzas,
        }
    }

    /// Reassemble a lockfile from decoded parts
    pub fn from_parts(version: Version, fingerprint: Fingerprint, stanzas: Vec<Stanza>) -> Self {
        Self {
            version,
            fingerprint,
            stanzas,
        }
    }

    /// Schema version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Overall fingerprint
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// All stanzas
    pub fn stanzas(&self) -> &[Stanza] {
        &self.stanzas
    }

    /// Stanza identifiers, in stored order
    pub fn stanza_ids(&self) -> impl Iterator<Item = &str> {
        self.stanzas.iter().map(|s| s.identifier.as_str())
    }

    /// Find a stanza by identifier
    pub fn stanza(&self, identifier: &str) -> Option<&Stanza> {
        self.stanzas.iter().find(|s| s.identifier == identifier)
    }

    /// Find a stanza and borrow its state as `T`
    pub fn typed_stanza<T: TypedState>(&self, identifier: &str) -> Option<&T> {
        self.stanza(identifier).and_then(|s| s.typed_state::<T>())
    }
}
