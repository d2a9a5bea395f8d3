//! Fingerprint algebra
//!
//! A [`Fingerprint`] is a canonical, comparable identity for some piece of
//! content. Every variant reduces to a byte sequence ([`Fingerprint::as_bytes`]),
//! and fingerprints are ordered by that byte sequence. Fingerprints of
//! several inputs aggregate into a one-way [`Fingerprint::Compound`].
//!
//! File-backed constructors live in [`crate::infra::fingerprint`]; this
//! module performs no I/O.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Digest as _;

use super::hashing::{self, DigestEncoding, HashAlgorithm};

/// Byte encoding used when reducing a fingerprint to bytes
///
/// `Legacy` reproduces the narrow encodings of the original `v1` lockfile
/// schema; `Wide` keeps every bit of every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintEncoding {
    /// Narrow encodings (low byte of numerics, high half of digest sizes)
    Legacy,
    /// Full-width encodings
    Wide,
}

/// Raw bytes with a cached SHA-1 digest and hash code
#[derive(Debug, Clone)]
pub struct ByteContent {
    value: Vec<u8>,
    digest: String,
    hash_code: i32,
}

impl ByteContent {
    /// Wrap bytes, computing the cached digest
    pub fn new(value: Vec<u8>) -> Self {
        let digest = hashing::sha1_base64(&value);
        let hash_code = hashing::string_hash_code(&digest);
        Self {
            value,
            digest,
            hash_code,
        }
    }

    /// The wrapped bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Base64 SHA-1 digest of the bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Hash code of the digest string
    pub fn hash_code(&self) -> i32 {
        self.hash_code
    }
}

impl PartialEq for ByteContent {
    fn eq(&self, other: &Self) -> bool {
        self.hash_code == other.hash_code && self.value == other.value
    }
}

impl Eq for ByteContent {}

/// Content identity
#[derive(Debug, Clone)]
pub enum Fingerprint {
    /// Absence of content
    NoContent,

    /// An arbitrary unique number
    Numeric(i64),

    /// A file's modification time and size
    FileState {
        /// Last modification time, milliseconds since the Unix epoch
        last_modified_millis: i64,
        /// Size in bytes
        size_bytes: i64,
    },

    /// A file's size and the hash code of its SHA-1 content digest
    FileDigest {
        /// Size in bytes
        size_bytes: i64,
        /// Hash code of the base64 SHA-1 digest of the content
        content_hash_code: i32,
    },

    /// A raw byte payload
    Bytes(ByteContent),

    /// A digest computed with a named algorithm
    Digest {
        /// Algorithm that produced `value`
        algorithm: HashAlgorithm,
        /// Preferred text rendering of `value`
        encoding: Option<DigestEncoding>,
        /// Raw digest bytes
        value: Vec<u8>,
    },

    /// A string payload
    Text(String),

    /// One-way aggregate over other fingerprints
    Compound(BTreeSet<Fingerprint>),

    /// Bytes reconstructed from a stored lockfile; the original variant is unknown
    Raw(Vec<u8>),

    /// Hash code read from a hash-mode lockfile; the bytes it was computed
    /// over are unknown
    StoredHash(i32),
}

impl Fingerprint {
    /// Fingerprint of a number
    pub fn of_number(value: i64) -> Self {
        Self::Numeric(value)
    }

    /// Fingerprint of raw bytes
    pub fn of_bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(ByteContent::new(value.into()))
    }

    /// Fingerprint of a string
    pub fn of_str(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Digest `bytes` with `algorithm`
    pub fn of_digest(
        algorithm: HashAlgorithm,
        bytes: &[u8],
        encoding: Option<DigestEncoding>,
    ) -> Self {
        Self::Digest {
            algorithm,
            encoding,
            value: algorithm.digest(bytes),
        }
    }

    /// Aggregate fingerprints into a [`Fingerprint::Compound`]
    ///
    /// Constituents are normalized into a sorted set, so insertion order does
    /// not affect the result.
    pub fn compound(constituents: impl IntoIterator<Item = Fingerprint>) -> Self {
        Self::Compound(constituents.into_iter().collect())
    }

    /// Canonical bytes (full-width encoding)
    pub fn as_bytes(&self) -> Vec<u8> {
        self.encode(FingerprintEncoding::Wide)
    }

    /// Canonical bytes under a specific encoding
    pub fn encode(&self, encoding: FingerprintEncoding) -> Vec<u8> {
        use FingerprintEncoding::{Legacy, Wide};

        match (self, encoding) {
            (Self::NoContent, _) => Vec::new(),
            // Only the low byte survives in the legacy schema
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            (Self::Numeric(value), Legacy) => vec![*value as u8],
            (Self::Numeric(value), Wide) => value.to_be_bytes().to_vec(),
            (
                Self::FileState {
                    last_modified_millis,
                    size_bytes,
                },
                _,
            ) => {
                let mut out = Vec::with_capacity(16);
                out.extend_from_slice(&last_modified_millis.to_be_bytes());
                out.extend_from_slice(&size_bytes.to_be_bytes());
                out
            }
            // Legacy emits the high 32 bits of the size and nothing else
            #[allow(clippy::cast_possible_truncation)]
            (Self::FileDigest { size_bytes, .. }, Legacy) => {
                ((*size_bytes >> 32) as i32).to_be_bytes().to_vec()
            }
            (
                Self::FileDigest {
                    size_bytes,
                    content_hash_code,
                },
                Wide,
            ) => {
                let mut out = Vec::with_capacity(12);
                out.extend_from_slice(&size_bytes.to_be_bytes());
                out.extend_from_slice(&content_hash_code.to_be_bytes());
                out
            }
            (Self::Bytes(content), _) => content.value.clone(),
            (Self::Digest { value, .. }, _) | (Self::Raw(value), _) => value.clone(),
            (Self::Text(value), _) => value.as_bytes().to_vec(),
            (Self::StoredHash(hash), _) => hash.to_be_bytes().to_vec(),
            (Self::Compound(constituents), Legacy) => {
                let mut joined = Vec::new();
                for constituent in constituents {
                    joined.extend(constituent.encode(Legacy));
                }
                hashing::hash_code_of(&joined).to_be_bytes().to_vec()
            }
            (Self::Compound(constituents), Wide) => {
                let mut hasher = Sha1::new();
                for constituent in constituents {
                    let bytes = constituent.encode(Wide);
                    #[allow(clippy::cast_possible_truncation)]
                    hasher.update((bytes.len() as u32).to_be_bytes());
                    hasher.update(&bytes);
                }
                hasher.finalize().to_vec()
            }
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoContent => "none",
            Self::Numeric(_) => "numeric",
            Self::FileState { .. } => "file-state",
            Self::FileDigest { .. } => "file-digest",
            Self::Bytes(_) => "bytes",
            Self::Digest { .. } => "digest",
            Self::Text(_) => "text",
            Self::Compound(_) => "compound",
            Self::Raw(_) => "raw",
            Self::StoredHash(_) => "stored-hash",
        }
    }

    /// Whether this fingerprint represents absent content
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// Render the canonical bytes as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    fn tag(&self) -> u8 {
        match self {
            Self::NoContent => 0,
            Self::Numeric(_) => 1,
            Self::FileState { .. } => 2,
            Self::FileDigest { .. } => 3,
            Self::Bytes(_) => 4,
            Self::Digest { .. } => 5,
            Self::Text(_) => 6,
            Self::Compound(_) => 7,
            Self::Raw(_) => 8,
            Self::StoredHash(_) => 9,
        }
    }
}

impl Ord for Fingerprint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes()
            .cmp(&other.as_bytes())
            .then_with(|| self.tag().cmp(&other.tag()))
            .then_with(|| match (self, other) {
                (
                    Self::Digest {
                        algorithm: a,
                        encoding: ea,
                        ..
                    },
                    Self::Digest {
                        algorithm: b,
                        encoding: eb,
                        ..
                    },
                ) => a.cmp(b).then_with(|| ea.cmp(eb)),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for Fingerprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        self.as_bytes().hash(state);
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContent => f.write_str("none"),
            Self::Digest {
                algorithm,
                encoding: Some(encoding),
                value,
            } => write!(f, "{algorithm}:{}", encoding.encode(value)),
            other => write!(f, "{}:{}", other.kind(), other.to_hex()),
        }
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::NoContent
    }
}

impl From<i64> for Fingerprint {
    fn from(value: i64) -> Self {
        Self::of_number(value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self::of_str(value)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self::of_str(value)
    }
}

impl From<Vec<u8>> for Fingerprint {
    fn from(value: Vec<u8>) -> Self {
        Self::of_bytes(value)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(value: &[u8]) -> Self {
        Self::of_bytes(value)
    }
}

impl FromIterator<Fingerprint> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self::compound(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::test_utils::generators::fingerprint;
    use proptest::prelude::*;

    #[test]
    fn test_no_content_is_empty_bytes() {
        assert!(Fingerprint::NoContent.as_bytes().is_empty());
        assert!(Fingerprint::NoContent.is_empty());
    }

    #[test]
    fn test_numeric_encodings() {
        let fp = Fingerprint::of_number(0x0102_0304_0506_0708);
        assert_eq!(fp.as_bytes(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(fp.encode(FingerprintEncoding::Legacy), vec![8]);
    }

    #[test]
    fn test_file_state_layout() {
        let fp = Fingerprint::FileState {
            last_modified_millis: 1,
            size_bytes: 0x0100,
        };
        let bytes = fp.as_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0, 0, 0, 1, 0]);
        assert_eq!(fp.encode(FingerprintEncoding::Legacy), bytes);
    }

    #[test]
    fn test_file_digest_encodings() {
        let fp = Fingerprint::FileDigest {
            size_bytes: 0x0000_0002_0000_0010,
            content_hash_code: -1,
        };
        assert_eq!(fp.encode(FingerprintEncoding::Legacy), vec![0, 0, 0, 2]);
        let wide = fp.as_bytes();
        assert_eq!(wide.len(), 12);
        assert_eq!(&wide[8..], &[0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_bytes_and_text() {
        let fp = Fingerprint::of_bytes(b"abc".to_vec());
        assert_eq!(fp.as_bytes(), b"abc");
        if let Fingerprint::Bytes(content) = &fp {
            assert_eq!(content.digest(), hashing::sha1_base64(b"abc"));
            assert_eq!(content.hash_code(), hashing::hash_code_of(b"abc"));
        } else {
            panic!("expected bytes fingerprint");
        }
        assert_eq!(Fingerprint::of_str("héllo").as_bytes(), "héllo".as_bytes());
    }

    #[test]
    fn test_digest_variant() {
        let fp = Fingerprint::of_digest(HashAlgorithm::Sha256, b"abc", Some(DigestEncoding::Hex));
        assert_eq!(fp.as_bytes().len(), 32);
        assert!(fp.to_string().starts_with("SHA-256:ba7816bf"));

        let other = Fingerprint::Digest {
            algorithm: HashAlgorithm::Sha1,
            encoding: None,
            value: fp.as_bytes(),
        };
        assert_ne!(fp, other, "same bytes under a different algorithm differ");
    }

    #[test]
    fn test_compound_is_order_independent() {
        let a = Fingerprint::of_str("a");
        let b = Fingerprint::of_number(7);
        let c = Fingerprint::of_bytes(vec![9, 9]);

        let forward = Fingerprint::compound([a.clone(), b.clone(), c.clone()]);
        let backward: Fingerprint = [c, b, a].into_iter().collect();
        assert_eq!(forward.as_bytes(), backward.as_bytes());
        assert_eq!(forward.as_bytes().len(), 20);
        assert_eq!(forward.encode(FingerprintEncoding::Legacy).len(), 4);
    }

    #[test]
    fn test_compound_distinguishes_boundaries() {
        let left = Fingerprint::compound([Fingerprint::of_str("ab"), Fingerprint::of_str("c")]);
        let right = Fingerprint::compound([Fingerprint::of_str("a"), Fingerprint::of_str("bc")]);
        assert_ne!(left.as_bytes(), right.as_bytes());
    }

    #[test]
    fn test_stored_hash_differs_from_raw_bytes_of_same_value() {
        let stored = Fingerprint::StoredHash(0x6162_6364);
        let raw = Fingerprint::Raw(b"abcd".to_vec());
        assert_eq!(stored.as_bytes(), raw.as_bytes());
        assert_ne!(stored, raw);
        assert_eq!(stored.kind(), "stored-hash");
    }

    #[test]
    fn test_display() {
        assert_eq!(Fingerprint::NoContent.to_string(), "none");
        assert_eq!(Fingerprint::of_number(1).to_string(), "numeric:0000000000000001");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn prop_bytes_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(Fingerprint::of_bytes(bytes.clone()).as_bytes(), bytes);
        }

        #[test]
        fn prop_as_bytes_is_deterministic(fp in fingerprint()) {
            prop_assert_eq!(fp.as_bytes(), fp.clone().as_bytes());
            prop_assert_eq!(
                fp.encode(FingerprintEncoding::Legacy),
                fp.clone().encode(FingerprintEncoding::Legacy)
            );
        }

        #[test]
        fn prop_order_follows_bytes(a in fingerprint(), b in fingerprint()) {
            let by_bytes = a.as_bytes().cmp(&b.as_bytes());
            if by_bytes != Ordering::Equal {
                prop_assert_eq!(a.cmp(&b), by_bytes);
            }
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn prop_order_is_transitive(a in fingerprint(), b in fingerprint(), c in fingerprint()) {
            let mut sorted = [a, b, c];
            sorted.sort();
            prop_assert!(sorted[0] <= sorted[1]);
            prop_assert!(sorted[1] <= sorted[2]);
            prop_assert!(sorted[0] <= sorted[2]);
        }

        #[test]
        fn prop_compound_ignores_insertion_order(
            mut items in proptest::collection::vec(fingerprint(), 0..8)
        ) {
            let forward = Fingerprint::compound(items.clone());
            items.reverse();
            let backward = Fingerprint::compound(items);
            prop_assert_eq!(forward.as_bytes(), backward.as_bytes());
        }
    }
}
