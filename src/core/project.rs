//! Project handle
//!
//! The lockfile core needs only a project's root and a stable hash of its
//! parsed manifest; manifest parsing itself happens elsewhere.

use serde::Serialize;
use sha1::Sha1;
use sha2::Digest as _;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::fingerprint::Fingerprint;

/// A parsed project manifest
pub trait ProjectManifest: fmt::Debug + Send + Sync {
    /// Hash of the manifest's parsed structure
    ///
    /// Must be stable across processes: structurally equal manifests hash
    /// equal, regardless of how their source text was formatted.
    fn structural_hash(&self) -> i64;
}

/// Stable structural hash of any serializable value
///
/// The value is serialized to JSON and digested with SHA-1; the first 8
/// bytes of the digest form the hash. Map-typed fields must serialize in a
/// deterministic order (`BTreeMap`, not `HashMap`).
pub fn structural_hash_of<T: Serialize + ?Sized>(value: &T) -> Result<i64, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha1::digest(&bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(i64::from_be_bytes(head))
}

/// A project whose lockfile is being built or read
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: Arc<dyn ProjectManifest>,
}

impl Project {
    /// Create a project handle
    pub fn new(root: impl Into<PathBuf>, manifest: Arc<dyn ProjectManifest>) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parsed manifest
    pub fn manifest(&self) -> &dyn ProjectManifest {
        self.manifest.as_ref()
    }
}

impl Fingerprint {
    /// Cheap project fingerprint from the manifest's structural hash
    pub fn for_project(project: &Project) -> Self {
        Self::of_number(project.manifest().structural_hash())
    }
}
