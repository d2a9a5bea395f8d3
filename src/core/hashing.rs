//! Hashing primitives
//!
//! Named digest algorithms, text encodings for digest output, and the
//! 32-bit hash code used to reduce digests to a single scalar.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::error::FingerprintError;

/// Digest algorithms available to fingerprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-1 (160 bits)
    #[serde(rename = "SHA-1")]
    Sha1,
    /// SHA-256
    #[serde(rename = "SHA-256")]
    Sha256,
    /// SHA-512
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Canonical algorithm name
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Digest a byte slice
    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(bytes).to_vec(),
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
            Self::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(FingerprintError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Text encodings for rendering digest bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    /// Lowercase hexadecimal
    Hex,
    /// Standard base64 with padding
    Base64,
}

impl DigestEncoding {
    /// Render digest bytes as text
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => BASE64.encode(bytes),
        }
    }
}

/// SHA-1 digest of `bytes`, rendered as base64
pub fn sha1_base64(bytes: &[u8]) -> String {
    BASE64.encode(Sha1::digest(bytes))
}

/// 31-polynomial hash over the UTF-16 code units of `s`
///
/// Matches the hash code long used for lockfile scalars, so hashes stay
/// comparable with lockfiles written by other Elide tooling.
pub fn string_hash_code(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Reduce bytes to a 32-bit scalar: SHA-1, base64, then hash code
pub fn hash_code_of(bytes: &[u8]) -> i32 {
    string_hash_code(&sha1_base64(bytes))
}

/// Decode a base64 scalar written by [`DigestEncoding::Base64`]
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}
