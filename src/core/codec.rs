//! Lockfile codecs
//!
//! A [`LockfileDefinition`] binds one schema [`Version`] to a reader and a
//! writer for each physical [`Format`]. Both formats share one logical
//! document shape:
//!
//! - JSON: a self-describing tree with named fields.
//! - Binary: CBOR under the self-describe tag, with maps keyed by stable
//!   integer field numbers.
//!
//! Fingerprints are not written structurally. Each one is reduced to a
//! single scalar ([`FingerprintRepr`]). A stored hash reads back as
//! [`Fingerprint::StoredHash`] and stored bytes as [`Fingerprint::Raw`], so a
//! round trip preserves change detection but not the original variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use super::fingerprint::{Fingerprint, FingerprintEncoding};
use super::hashing;
use super::lockfile::{Format, Lockfile, Version};
use super::material::{Ecosystem, InputMaterial, Remarks};
use super::stanza::{Stanza, StanzaState};
use crate::error::LockfileError;

/// Scalar written for each fingerprint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// 32-bit hash code of the base64 SHA-1 of the fingerprint bytes
    #[default]
    Hash,
    /// The fingerprint bytes themselves
    Bytes,
}

/// On-disk form of a fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FingerprintRepr {
    /// Reduced hash code
    Hash {
        /// Hash code
        hash: i32,
    },
    /// Raw fingerprint bytes
    Bytes {
        /// Bytes, base64 in text formats
        #[serde(with = "base64_text")]
        bytes: Vec<u8>,
    },
}

impl FingerprintRepr {
    /// Reduce a fingerprint for writing
    ///
    /// A [`Fingerprint::StoredHash`] is written back as that hash in either
    /// mode, since the bytes behind it are gone. Everything else, including
    /// [`Fingerprint::Raw`], is reduced from its bytes.
    pub fn reduce(
        fingerprint: &Fingerprint,
        mode: FingerprintMode,
        encoding: FingerprintEncoding,
    ) -> Self {
        match (mode, fingerprint) {
            (_, Fingerprint::StoredHash(hash)) => Self::Hash { hash: *hash },
            (FingerprintMode::Hash, _) => Self::Hash {
                hash: hashing::hash_code_of(&fingerprint.encode(encoding)),
            },
            (FingerprintMode::Bytes, _) => Self::Bytes {
                bytes: fingerprint.encode(encoding),
            },
        }
    }

    /// Reconstitute the stored scalar, keeping track of which kind it was
    pub fn into_fingerprint(self) -> Fingerprint {
        match self {
            Self::Hash { hash } => Fingerprint::StoredHash(hash),
            Self::Bytes { bytes } => Fingerprint::Raw(bytes),
        }
    }
}

/// Hash code a fingerprint reduces to when written under `version`
pub fn reduced_hash(fingerprint: &Fingerprint, version: Version) -> i32 {
    match FingerprintRepr::reduce(fingerprint, FingerprintMode::Hash, version.encoding) {
        FingerprintRepr::Hash { hash } => hash,
        FingerprintRepr::Bytes { bytes } => hashing::hash_code_of(&bytes),
    }
}

mod base64_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::core::hashing::{self, DigestEncoding};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&DigestEncoding::Base64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hashing::decode_base64(&text).map_err(serde::de::Error::custom)
    }
}

/// Binds a schema version to concrete readers and writers
pub trait LockfileDefinition: fmt::Debug + Send + Sync {
    /// Version this definition reads and writes
    fn version(&self) -> Version;

    /// Decode a lockfile from a stream
    fn read_from(&self, format: Format, reader: &mut dyn Read) -> Result<Lockfile, LockfileError>;

    /// Encode a lockfile to a stream
    ///
    /// # Panics
    ///
    /// Panics if `lockfile` is not of this definition's version.
    fn write_to(
        &self,
        format: Format,
        lockfile: &Lockfile,
        writer: &mut dyn Write,
    ) -> Result<(), LockfileError>;
}

/// Standard definition shared by every registered version
#[derive(Debug, Clone, Copy)]
pub struct LockfileCodec {
    version: Version,
    mode: FingerprintMode,
}

impl LockfileCodec {
    /// Codec for `version`, writing hash-mode fingerprints
    pub fn new(version: Version) -> Self {
        Self {
            version,
            mode: FingerprintMode::default(),
        }
    }

    /// Change the fingerprint scalar written
    #[must_use]
    pub fn with_mode(mut self, mode: FingerprintMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fingerprint scalar written
    pub fn mode(&self) -> FingerprintMode {
        self.mode
    }

    fn reduce(&self, fingerprint: &Fingerprint) -> FingerprintRepr {
        FingerprintRepr::reduce(fingerprint, self.mode, self.version.encoding)
    }

    fn to_document(&self, lockfile: &Lockfile) -> LockfileDocument {
        LockfileDocument {
            version: self.version.label.to_string(),
            fingerprint: self.reduce(lockfile.fingerprint()),
            stanzas: lockfile
                .stanzas()
                .iter()
                .map(|stanza| StanzaDocument {
                    identifier: stanza.identifier.clone(),
                    fingerprint: self.reduce(&stanza.fingerprint),
                    contributed_by: stanza.contributed_by.clone(),
                    inputs: stanza.inputs.iter().map(|i| self.input_document(i)).collect(),
                    remarks: stanza.remarks.clone(),
                    state: stanza.state.clone(),
                })
                .collect(),
        }
    }

    fn input_document(&self, input: &InputMaterial) -> InputDocument {
        match input {
            InputMaterial::DependencyManifest {
                ecosystem,
                identifier,
                fingerprint,
                remarks,
            } => InputDocument::DependencyManifest {
                ecosystem: *ecosystem,
                identifier: identifier.clone(),
                fingerprint: self.reduce(fingerprint),
                remarks: remarks.clone(),
            },
            InputMaterial::PeerLockfile {
                tool,
                identifier,
                fingerprint,
                remarks,
            } => InputDocument::PeerLockfile {
                tool: tool.clone(),
                identifier: identifier.clone(),
                fingerprint: self.reduce(fingerprint),
                remarks: remarks.clone(),
            },
        }
    }

    fn from_document(&self, document: LockfileDocument) -> Result<Lockfile, LockfileError> {
        let version = match Version::from_label(&document.version) {
            Some(version) if version.supported => version,
            _ => {
                return Err(LockfileError::UnsupportedVersion {
                    label: document.version,
                })
            }
        };
        if version != self.version {
            return Err(LockfileError::VersionMismatch {
                expected: self.version.label.to_string(),
                found: version.label.to_string(),
            });
        }

        let stanzas = document
            .stanzas
            .into_iter()
            .map(|stanza| Stanza {
                identifier: stanza.identifier,
                contributed_by: stanza.contributed_by,
                inputs: stanza.inputs.into_iter().map(InputDocument::into_input).collect(),
                fingerprint: stanza.fingerprint.into_fingerprint(),
                remarks: stanza.remarks,
                state: stanza.state,
            })
            .collect();

        Ok(Lockfile::from_parts(
            version,
            document.fingerprint.into_fingerprint(),
            stanzas,
        ))
    }
}

impl LockfileDefinition for LockfileCodec {
    fn version(&self) -> Version {
        self.version
    }

    fn read_from(&self, format: Format, reader: &mut dyn Read) -> Result<Lockfile, LockfileError> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| LockfileError::read(format, e))?;

        let format = match format {
            Format::Auto => Format::sniff(&buf),
            other => other,
        };
        let document = match format {
            Format::Json => {
                serde_json::from_slice(&buf).map_err(|e| LockfileError::read(format, e))?
            }
            _ => binary::decode(&buf).map_err(|e| LockfileError::read(format, e))?,
        };
        tracing::debug!(
            "Decoded {format} lockfile ({} bytes, version '{}')",
            buf.len(),
            document.version
        );
        self.from_document(document)
    }

    fn write_to(
        &self,
        format: Format,
        lockfile: &Lockfile,
        writer: &mut dyn Write,
    ) -> Result<(), LockfileError> {
        assert_eq!(
            lockfile.version(),
            self.version,
            "lockfile version '{}' cannot be written by the '{}' definition",
            lockfile.version(),
            self.version
        );

        let format = self.version.resolve_format(format);
        let document = self.to_document(lockfile);
        match format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, &document)
                    .map_err(|e| LockfileError::write(format, e))?;
                writer
                    .write_all(b"\n")
                    .map_err(|e| LockfileError::write(format, e))?;
            }
            _ => binary::encode(&document, &mut *writer)
                .map_err(|e| LockfileError::write(format, e))?,
        }
        writer.flush().map_err(|e| LockfileError::write(format, e))
    }
}

impl Version {
    /// Definition that reads and writes this version
    pub fn definition(self) -> Arc<dyn LockfileDefinition> {
        Arc::new(LockfileCodec::new(self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LockfileDocument {
    version: String,
    fingerprint: FingerprintRepr,
    #[serde(default)]
    stanzas: Vec<StanzaDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StanzaDocument {
    identifier: String,
    fingerprint: FingerprintRepr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contributed_by: Option<String>,
    #[serde(default)]
    inputs: Vec<InputDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remarks: Option<Remarks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<StanzaState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum InputDocument {
    DependencyManifest {
        ecosystem: Ecosystem,
        identifier: String,
        fingerprint: FingerprintRepr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remarks: Option<Remarks>,
    },
    PeerLockfile {
        tool: String,
        identifier: String,
        fingerprint: FingerprintRepr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remarks: Option<Remarks>,
    },
}

impl InputDocument {
    fn into_input(self) -> InputMaterial {
        match self {
            Self::DependencyManifest {
                ecosystem,
                identifier,
                fingerprint,
                remarks,
            } => InputMaterial::DependencyManifest {
                ecosystem,
                identifier,
                fingerprint: fingerprint.into_fingerprint(),
                remarks,
            },
            Self::PeerLockfile {
                tool,
                identifier,
                fingerprint,
                remarks,
            } => InputMaterial::PeerLockfile {
                tool,
                identifier,
                fingerprint: fingerprint.into_fingerprint(),
                remarks,
            },
        }
    }
}

/// Numbered-field CBOR mapping of the lockfile document
mod binary {
    use ciborium::value::Value;
    use std::io::Write;
    use thiserror::Error;

    use super::{FingerprintRepr, InputDocument, LockfileDocument, StanzaDocument};
    use crate::core::material::{Ecosystem, Remarks};

    /// CBOR self-describe tag
    const SELF_DESCRIBE: u64 = 55799;

    mod field {
        pub const LOCKFILE_VERSION: u8 = 1;
        pub const LOCKFILE_FINGERPRINT: u8 = 2;
        pub const LOCKFILE_STANZAS: u8 = 3;

        pub const STANZA_IDENTIFIER: u8 = 1;
        pub const STANZA_FINGERPRINT: u8 = 2;
        pub const STANZA_CONTRIBUTED_BY: u8 = 3;
        pub const STANZA_INPUTS: u8 = 4;
        pub const STANZA_REMARKS: u8 = 5;
        pub const STANZA_STATE: u8 = 6;

        pub const INPUT_KIND: u8 = 1;
        pub const INPUT_IDENTIFIER: u8 = 2;
        pub const INPUT_FINGERPRINT: u8 = 3;
        pub const INPUT_REMARKS: u8 = 4;
        pub const INPUT_ORIGIN: u8 = 5;
    }

    const KIND_DEPENDENCY_MANIFEST: u8 = 0;
    const KIND_PEER_LOCKFILE: u8 = 1;

    #[derive(Error, Debug)]
    pub enum BinaryError {
        #[error("{record} is missing field {field}")]
        MissingField { record: &'static str, field: u8 },

        #[error("{record} field {field} has an unexpected type")]
        UnexpectedType { record: &'static str, field: u8 },

        #[error("unknown input kind {0}")]
        UnknownInputKind(i128),

        #[error("unknown ecosystem '{0}'")]
        UnknownEcosystem(String),

        #[error("invalid stanza state: {0}")]
        State(String),

        #[error("malformed CBOR: {0}")]
        Cbor(String),
    }

    fn key(field: u8) -> Value {
        Value::Integer(field.into())
    }

    fn fingerprint_value(repr: &FingerprintRepr) -> Value {
        match repr {
            FingerprintRepr::Hash { hash } => Value::Integer((*hash).into()),
            FingerprintRepr::Bytes { bytes } => Value::Bytes(bytes.clone()),
        }
    }

    fn remarks_value(remarks: &Remarks) -> Value {
        Value::Text(remarks.message.clone())
    }

    fn input_value(input: &InputDocument) -> Value {
        let (kind, identifier, fingerprint, remarks, origin) = match input {
            InputDocument::DependencyManifest {
                ecosystem,
                identifier,
                fingerprint,
                remarks,
            } => (
                KIND_DEPENDENCY_MANIFEST,
                identifier,
                fingerprint,
                remarks,
                ecosystem.as_str().to_string(),
            ),
            InputDocument::PeerLockfile {
                tool,
                identifier,
                fingerprint,
                remarks,
            } => (KIND_PEER_LOCKFILE, identifier, fingerprint, remarks, tool.clone()),
        };

        let mut entries = vec![
            (key(field::INPUT_KIND), Value::Integer(kind.into())),
            (key(field::INPUT_IDENTIFIER), Value::Text(identifier.clone())),
            (key(field::INPUT_FINGERPRINT), fingerprint_value(fingerprint)),
        ];
        if let Some(remarks) = remarks {
            entries.push((key(field::INPUT_REMARKS), remarks_value(remarks)));
        }
        entries.push((key(field::INPUT_ORIGIN), Value::Text(origin)));
        Value::Map(entries)
    }

    fn stanza_value(stanza: &StanzaDocument) -> Result<Value, BinaryError> {
        let mut entries = vec![
            (key(field::STANZA_IDENTIFIER), Value::Text(stanza.identifier.clone())),
            (key(field::STANZA_FINGERPRINT), fingerprint_value(&stanza.fingerprint)),
        ];
        if let Some(contributor) = &stanza.contributed_by {
            entries.push((key(field::STANZA_CONTRIBUTED_BY), Value::Text(contributor.clone())));
        }
        if !stanza.inputs.is_empty() {
            entries.push((
                key(field::STANZA_INPUTS),
                Value::Array(stanza.inputs.iter().map(input_value).collect()),
            ));
        }
        if let Some(remarks) = &stanza.remarks {
            entries.push((key(field::STANZA_REMARKS), remarks_value(remarks)));
        }
        if let Some(state) = &stanza.state {
            let value =
                Value::serialized(state).map_err(|e| BinaryError::State(e.to_string()))?;
            entries.push((key(field::STANZA_STATE), value));
        }
        Ok(Value::Map(entries))
    }

    pub fn encode(document: &LockfileDocument, writer: &mut dyn Write) -> Result<(), BinaryError> {
        let stanzas = document
            .stanzas
            .iter()
            .map(stanza_value)
            .collect::<Result<Vec<_>, _>>()?;
        let root = Value::Map(vec![
            (key(field::LOCKFILE_VERSION), Value::Text(document.version.clone())),
            (
                key(field::LOCKFILE_FINGERPRINT),
                fingerprint_value(&document.fingerprint),
            ),
            (key(field::LOCKFILE_STANZAS), Value::Array(stanzas)),
        ]);
        let tagged = Value::Tag(SELF_DESCRIBE, Box::new(root));
        ciborium::ser::into_writer(&tagged, writer).map_err(|e| BinaryError::Cbor(e.to_string()))
    }

    /// Fields of one decoded CBOR map
    struct Record {
        name: &'static str,
        entries: Vec<(Value, Value)>,
    }

    impl Record {
        fn new(name: &'static str, value: Value) -> Result<Self, BinaryError> {
            match value {
                Value::Map(entries) => Ok(Self { name, entries }),
                _ => Err(BinaryError::UnexpectedType {
                    record: name,
                    field: 0,
                }),
            }
        }

        fn take(&mut self, field: u8) -> Option<Value> {
            let position = self.entries.iter().position(|(k, _)| match k {
                Value::Integer(i) => i128::from(*i) == i128::from(field),
                _ => false,
            })?;
            Some(self.entries.swap_remove(position).1)
        }

        fn required(&mut self, field: u8) -> Result<Value, BinaryError> {
            self.take(field).ok_or(BinaryError::MissingField {
                record: self.name,
                field,
            })
        }

        fn mismatch(&self, field: u8) -> BinaryError {
            BinaryError::UnexpectedType {
                record: self.name,
                field,
            }
        }

        fn text(&mut self, field: u8) -> Result<String, BinaryError> {
            match self.required(field)? {
                Value::Text(text) => Ok(text),
                _ => Err(self.mismatch(field)),
            }
        }

        fn optional_text(&mut self, field: u8) -> Result<Option<String>, BinaryError> {
            match self.take(field) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Text(text)) => Ok(Some(text)),
                Some(_) => Err(self.mismatch(field)),
            }
        }

        fn fingerprint(&mut self, field: u8) -> Result<FingerprintRepr, BinaryError> {
            match self.required(field)? {
                Value::Integer(i) => i32::try_from(i)
                    .map(|hash| FingerprintRepr::Hash { hash })
                    .map_err(|_| self.mismatch(field)),
                Value::Bytes(bytes) => Ok(FingerprintRepr::Bytes { bytes }),
                _ => Err(self.mismatch(field)),
            }
        }

        fn array(&mut self, field: u8) -> Result<Vec<Value>, BinaryError> {
            match self.take(field) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(items)) => Ok(items),
                Some(_) => Err(self.mismatch(field)),
            }
        }

        fn remarks(&mut self, field: u8) -> Result<Option<Remarks>, BinaryError> {
            Ok(self.optional_text(field)?.map(Remarks::new))
        }
    }

    fn decode_input(value: Value) -> Result<InputDocument, BinaryError> {
        let mut record = Record::new("input", value)?;
        let kind = match record.required(field::INPUT_KIND)? {
            Value::Integer(i) => i128::from(i),
            _ => return Err(record.mismatch(field::INPUT_KIND)),
        };
        let identifier = record.text(field::INPUT_IDENTIFIER)?;
        let fingerprint = record.fingerprint(field::INPUT_FINGERPRINT)?;
        let remarks = record.remarks(field::INPUT_REMARKS)?;
        let origin = record.text(field::INPUT_ORIGIN)?;

        if kind == i128::from(KIND_DEPENDENCY_MANIFEST) {
            let ecosystem =
                Ecosystem::from_name(&origin).ok_or(BinaryError::UnknownEcosystem(origin))?;
            Ok(InputDocument::DependencyManifest {
                ecosystem,
                identifier,
                fingerprint,
                remarks,
            })
        } else if kind == i128::from(KIND_PEER_LOCKFILE) {
            Ok(InputDocument::PeerLockfile {
                tool: origin,
                identifier,
                fingerprint,
                remarks,
            })
        } else {
            Err(BinaryError::UnknownInputKind(kind))
        }
    }

    fn decode_stanza(value: Value) -> Result<StanzaDocument, BinaryError> {
        let mut record = Record::new("stanza", value)?;
        let state = match record.take(field::STANZA_STATE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .deserialized()
                    .map_err(|e| BinaryError::State(e.to_string()))?,
            ),
        };
        Ok(StanzaDocument {
            identifier: record.text(field::STANZA_IDENTIFIER)?,
            fingerprint: record.fingerprint(field::STANZA_FINGERPRINT)?,
            contributed_by: record.optional_text(field::STANZA_CONTRIBUTED_BY)?,
            inputs: record
                .array(field::STANZA_INPUTS)?
                .into_iter()
                .map(decode_input)
                .collect::<Result<_, _>>()?,
            remarks: record.remarks(field::STANZA_REMARKS)?,
            state,
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<LockfileDocument, BinaryError> {
        let value: Value =
            ciborium::de::from_reader(bytes).map_err(|e| BinaryError::Cbor(e.to_string()))?;
        let value = match value {
            Value::Tag(SELF_DESCRIBE, inner) => *inner,
            other => other,
        };

        let mut record = Record::new("lockfile", value)?;
        Ok(LockfileDocument {
            version: record.text(field::LOCKFILE_VERSION)?,
            fingerprint: record.fingerprint(field::LOCKFILE_FINGERPRINT)?,
            stanzas: record
                .array(field::LOCKFILE_STANZAS)?
                .into_iter()
                .map(decode_stanza)
                .collect::<Result<_, _>>()?,
        })
    }

}
