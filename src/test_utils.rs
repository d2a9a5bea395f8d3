//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::fingerprint::Fingerprint;
    use crate::core::hashing::{DigestEncoding, HashAlgorithm};
    use crate::core::material::{Ecosystem, InputMaterial};
    use crate::core::stanza::Stanza;

    /// Generate a stanza or input identifier
    pub fn identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9._/-]{0,24}"
    }

    /// Generate a leaf (non-compound) fingerprint
    pub fn leaf_fingerprint() -> impl Strategy<Value = Fingerprint> {
        prop_oneof![
            Just(Fingerprint::NoContent),
            any::<i64>().prop_map(Fingerprint::of_number),
            (any::<i64>(), 0i64..i64::MAX).prop_map(|(last_modified_millis, size_bytes)| {
                Fingerprint::FileState {
                    last_modified_millis,
                    size_bytes,
                }
            }),
            (0i64..i64::MAX, any::<i32>()).prop_map(|(size_bytes, content_hash_code)| {
                Fingerprint::FileDigest {
                    size_bytes,
                    content_hash_code,
                }
            }),
            proptest::collection::vec(any::<u8>(), 0..32).prop_map(Fingerprint::of_bytes),
            (digest_algorithm(), proptest::collection::vec(any::<u8>(), 0..32)).prop_map(
                |(algorithm, bytes)| {
                    Fingerprint::of_digest(algorithm, &bytes, Some(DigestEncoding::Hex))
                }
            ),
            "\\PC{0,16}".prop_map(Fingerprint::of_str),
        ]
    }

    /// Generate any fingerprint, including nested compounds
    pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
        leaf_fingerprint().prop_recursive(3, 16, 4, |inner| {
            proptest::collection::vec(inner, 0..4).prop_map(Fingerprint::compound)
        })
    }

    /// Generate a digest algorithm
    pub fn digest_algorithm() -> impl Strategy<Value = HashAlgorithm> {
        prop_oneof![
            Just(HashAlgorithm::Sha1),
            Just(HashAlgorithm::Sha256),
            Just(HashAlgorithm::Sha512),
        ]
    }

    /// Generate a dependency ecosystem
    pub fn ecosystem() -> impl Strategy<Value = Ecosystem> {
        prop_oneof![
            Just(Ecosystem::Maven),
            Just(Ecosystem::Npm),
            Just(Ecosystem::Jsr),
            Just(Ecosystem::PyPi),
            Just(Ecosystem::RubyGems),
            Just(Ecosystem::HuggingFace),
            Just(Ecosystem::Git),
        ]
    }

    /// Generate an input material
    pub fn input_material() -> impl Strategy<Value = InputMaterial> {
        prop_oneof![
            (ecosystem(), identifier(), leaf_fingerprint()).prop_map(
                |(ecosystem, identifier, fingerprint)| {
                    InputMaterial::dependency_manifest(ecosystem, identifier, fingerprint)
                }
            ),
            ("[a-z]{2,8}", identifier(), leaf_fingerprint()).prop_map(
                |(tool, identifier, fingerprint)| {
                    InputMaterial::peer_lockfile(tool, identifier, fingerprint)
                }
            ),
        ]
    }

    /// Generate a stanza without contributor state
    pub fn stanza() -> impl Strategy<Value = Stanza> {
        (
            identifier(),
            fingerprint(),
            proptest::option::of("[a-z]{2,10}"),
            proptest::collection::vec(input_material(), 0..4),
            proptest::option::of("[ -~]{0,20}"),
        )
            .prop_map(|(identifier, fingerprint, contributor, inputs, remarks)| {
                let mut stanza = Stanza::new(identifier, fingerprint).with_inputs(inputs);
                if let Some(contributor) = contributor {
                    stanza = stanza.contributed_by(contributor);
                }
                if let Some(remarks) = remarks {
                    stanza = stanza.with_remarks(remarks);
                }
                stanza
            })
    }

    /// Generate stanzas with unique identifiers
    pub fn unique_stanzas() -> impl Strategy<Value = Vec<Stanza>> {
        proptest::collection::vec(stanza(), 0..5).prop_map(|stanzas| {
            let mut seen = std::collections::BTreeSet::new();
            stanzas
                .into_iter()
                .filter(|s| seen.insert(s.identifier.clone()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_identifier_generator(id in identifier()) {
            prop_assert!(!id.is_empty());
            prop_assert!(id.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
        }

        #[test]
        fn test_unique_stanzas_generator(stanzas in unique_stanzas()) {
            let mut ids: Vec<_> = stanzas.iter().map(|s| s.identifier.clone()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }
}
