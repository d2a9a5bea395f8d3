//! Lockfile model and codecs
//!
//! Nothing here touches the filesystem except through readers and writers
//! handed in by the caller; discovery and file I/O belong in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`fingerprint`] - Fingerprint values and their byte encodings
//! - [`hashing`] - Digest algorithms and stable string hashing
//! - [`material`] - Input materials recorded per stanza
//! - [`stanza`] - Stanzas and their typed per-tool state
//! - [`lockfile`] - Versions, formats, and the lockfile itself
//! - [`codec`] - JSON and binary reading and writing
//! - [`project`] - Project handle and manifest hashing
//! - [`contributor`] - Stanza contributors and their registry
//! - [`settings`] - Per-project lockfile settings

pub mod codec;
pub mod contributor;
pub mod fingerprint;
pub mod hashing;
pub mod lockfile;
pub mod material;
pub mod project;
pub mod settings;
pub mod stanza;
