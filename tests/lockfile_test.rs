//! Integration tests for lockfile encoding
//!
//! Covers:
//! - JSON and binary round trips through a version definition
//! - Typed stanza state surviving both formats
//! - Fingerprints reducing to a stable scalar across read and write
//! - Version label handling

mod common;

use proptest::prelude::*;
use std::sync::Arc;

use common::sample_lockfile;
use elide_lockfile::config::defaults::MIN_PROPTEST_ITERATIONS;
use elide_lockfile::core::codec::{
    reduced_hash, FingerprintMode, LockfileCodec, LockfileDefinition,
};
use elide_lockfile::core::fingerprint::Fingerprint;
use elide_lockfile::core::lockfile::{Format, Lockfile, Version};
use elide_lockfile::core::stanza::{MavenLockfileState, NpmLockfileState, Stanza};
use elide_lockfile::error::LockfileError;

fn encode(definition: &dyn LockfileDefinition, format: Format, lockfile: &Lockfile) -> Vec<u8> {
    let mut bytes = Vec::new();
    definition
        .write_to(format, lockfile, &mut bytes)
        .expect("Failed to write lockfile");
    bytes
}

fn decode(definition: &dyn LockfileDefinition, format: Format, bytes: &[u8]) -> Lockfile {
    definition
        .read_from(format, &mut &bytes[..])
        .expect("Failed to read lockfile")
}

/// Same identity as far as change detection goes
fn assert_equivalent(original: &Lockfile, decoded: &Lockfile) {
    let version = original.version();
    assert_eq!(decoded.version(), version);
    assert_eq!(
        reduced_hash(decoded.fingerprint(), version),
        reduced_hash(original.fingerprint(), version)
    );
    assert_eq!(
        decoded.stanza_ids().collect::<Vec<_>>(),
        original.stanza_ids().collect::<Vec<_>>()
    );
    for (a, b) in original.stanzas().iter().zip(decoded.stanzas()) {
        assert_eq!(
            reduced_hash(&b.fingerprint, version),
            reduced_hash(&a.fingerprint, version),
            "stanza '{}' fingerprint changed",
            a.identifier
        );
        assert_eq!(b.contributed_by, a.contributed_by);
        assert_eq!(b.remarks, a.remarks);
        assert_eq!(b.state, a.state);
        assert_eq!(
            b.inputs.iter().map(|i| i.identifier()).collect::<Vec<_>>(),
            a.inputs.iter().map(|i| i.identifier()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_json_round_trip_keeps_typed_state() {
    let definition = Version::latest().definition();
    let lockfile = sample_lockfile(Version::latest());

    let bytes = encode(definition.as_ref(), Format::Json, &lockfile);
    let decoded = decode(definition.as_ref(), Format::Json, &bytes);
    assert_equivalent(&lockfile, &decoded);

    let maven = decoded
        .typed_stanza::<MavenLockfileState>("maven")
        .expect("maven state");
    assert_eq!(maven.classpath[0].coordinate, "com.google.guava:guava:33.0.0-jre");
    let npm = decoded
        .typed_stanza::<NpmLockfileState>("npm")
        .expect("npm state");
    assert_eq!(npm.packages[0].name, "react");
    assert!(decoded.typed_stanza::<NpmLockfileState>("maven").is_none());
}

#[test]
fn test_binary_round_trip_matches_json_round_trip() {
    let definition = Version::latest().definition();
    let lockfile = sample_lockfile(Version::latest());

    let from_json = decode(
        definition.as_ref(),
        Format::Json,
        &encode(definition.as_ref(), Format::Json, &lockfile),
    );
    let from_binary = decode(
        definition.as_ref(),
        Format::Binary,
        &encode(definition.as_ref(), Format::Binary, &lockfile),
    );
    assert_equivalent(&lockfile, &from_binary);
    assert_eq!(from_json, from_binary);
}

#[test]
fn test_rewrite_after_read_is_byte_stable() {
    for version in Version::ALL {
        let definition = version.definition();
        let lockfile = sample_lockfile(version);
        for format in [Format::Json, Format::Binary] {
            let first = encode(definition.as_ref(), format, &lockfile);
            let decoded = decode(definition.as_ref(), format, &first);
            let second = encode(definition.as_ref(), format, &decoded);
            assert_eq!(first, second, "{version} {format} rewrite drifted");
        }
    }
}

#[test]
fn test_auto_reads_either_format() {
    let definition = Version::latest().definition();
    let lockfile = sample_lockfile(Version::latest());
    for format in [Format::Json, Format::Binary] {
        let bytes = encode(definition.as_ref(), format, &lockfile);
        assert_equivalent(&lockfile, &decode(definition.as_ref(), Format::Auto, &bytes));
    }
}

#[test]
fn test_bytes_mode_is_readable_by_hash_mode_reader() {
    let version = Version::latest();
    let writer = LockfileCodec::new(version).with_mode(FingerprintMode::Bytes);
    let lockfile = sample_lockfile(version);
    let bytes = encode(&writer, Format::Json, &lockfile);
    assert!(String::from_utf8_lossy(&bytes).contains("\"bytes\""));

    let decoded = decode(version.definition().as_ref(), Format::Json, &bytes);
    assert_equivalent(&lockfile, &decoded);
}

#[test]
fn test_unknown_version_label_is_rejected() {
    let json = br#"{"version":"v99","fingerprint":{"hash":0},"stanzas":[]}"#;
    let err = Version::latest()
        .definition()
        .read_from(Format::Json, &mut &json[..])
        .unwrap_err();
    assert!(matches!(err, LockfileError::UnsupportedVersion { ref label } if label == "v99"));
}

#[test]
fn test_known_but_different_version_is_a_mismatch() {
    let v1 = encode(
        Version::V1.definition().as_ref(),
        Format::Json,
        &sample_lockfile(Version::V1),
    );
    let err = Version::V2
        .definition()
        .read_from(Format::Json, &mut v1.as_slice())
        .unwrap_err();
    assert!(matches!(err, LockfileError::VersionMismatch { .. }));
}

#[test]
fn test_malformed_binary_is_a_read_error() {
    let err = Version::latest()
        .definition()
        .read_from(Format::Binary, &mut &[0xffu8, 0x00, 0x13][..])
        .unwrap_err();
    assert!(matches!(err, LockfileError::Read { format: Format::Binary, .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
#[should_panic(expected = "cannot be written")]
fn test_writing_another_version_panics() {
    let lockfile = sample_lockfile(Version::V1);
    let _ = encode(Version::V2.definition().as_ref(), Format::Json, &lockfile);
}

#[test]
fn test_lockfile_fingerprint_tracks_stanzas() {
    let a = sample_lockfile(Version::latest());
    let b = Lockfile::new(
        Version::latest(),
        a.stanzas()
            .iter()
            .cloned()
            .map(|s| {
                if s.identifier == "npm" {
                    Stanza {
                        fingerprint: Fingerprint::of_str("react@19.0.0"),
                        ..s
                    }
                } else {
                    s
                }
            })
            .collect::<Vec<_>>(),
    );
    assert_ne!(a.fingerprint(), b.fingerprint());
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn fingerprint_strategy() -> impl Strategy<Value = Fingerprint> {
    prop_oneof![
        any::<i64>().prop_map(Fingerprint::of_number),
        "[ -~]{0,32}".prop_map(Fingerprint::of_str),
        proptest::collection::vec(any::<u8>(), 0..64).prop_map(Fingerprint::of_bytes),
        (any::<i64>(), any::<i32>()).prop_map(|(size_bytes, content_hash_code)| {
            Fingerprint::FileDigest {
                size_bytes,
                content_hash_code,
            }
        }),
        Just(Fingerprint::NoContent),
    ]
}

fn stanzas_strategy() -> impl Strategy<Value = Vec<Stanza>> {
    proptest::collection::btree_map(identifier_strategy(), fingerprint_strategy(), 0..6).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, fp)| Stanza::new(id, fp))
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

    /// Both formats decode to the same lockfile, and that lockfile carries
    /// the same change-detection scalars as the original.
    #[test]
    fn prop_formats_agree(stanzas in stanzas_strategy(), v1 in any::<bool>()) {
        let version = if v1 { Version::V1 } else { Version::V2 };
        let definition: Arc<dyn LockfileDefinition> = version.definition();
        let lockfile = Lockfile::new(version, stanzas);

        let json = decode(definition.as_ref(), Format::Json, &encode(definition.as_ref(), Format::Json, &lockfile));
        let binary = decode(definition.as_ref(), Format::Binary, &encode(definition.as_ref(), Format::Binary, &lockfile));

        prop_assert_eq!(&json, &binary);
        prop_assert_eq!(
            reduced_hash(json.fingerprint(), version),
            reduced_hash(lockfile.fingerprint(), version)
        );
        for (a, b) in lockfile.stanzas().iter().zip(json.stanzas()) {
            prop_assert_eq!(&a.identifier, &b.identifier);
            prop_assert_eq!(
                reduced_hash(&a.fingerprint, version),
                reduced_hash(&b.fingerprint, version)
            );
        }
    }
}
