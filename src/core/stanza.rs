//! Lockfile stanzas
//!
//! A [`Stanza`] is one named, independently fingerprinted chapter of a
//! lockfile, contributed by a single producer. Producers may attach a typed
//! [`StanzaState`] payload (for example a resolved classpath).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::fingerprint::Fingerprint;
use super::material::{InputMaterial, Remarks};

/// Scope of a resolved dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    /// Required for compilation
    Compile,
    /// Required at runtime
    Runtime,
    /// Development only
    Development,
    /// Tests only
    Test,
    /// Provided by the runtime environment
    Provided,
    /// Provided by the host system
    System,
}

/// A resolved Maven artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenArtifact {
    /// `group:artifact:version[:classifier]` coordinate
    pub coordinate: String,
    /// Dependency scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<DependencyScope>,
    /// Path of the resolved artifact, relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl MavenArtifact {
    /// Artifact with only a coordinate
    pub fn new(coordinate: impl Into<String>) -> Self {
        Self {
            coordinate: coordinate.into(),
            scope: None,
            path: None,
        }
    }
}

/// State recorded by the Maven resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenLockfileState {
    /// Resolved classpath, in resolution order
    #[serde(default)]
    pub classpath: Vec<MavenArtifact>,
}

/// A resolved NPM package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpmPackage {
    /// Package name
    pub name: String,
    /// Exact resolved version
    pub version: String,
    /// Subresource integrity string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// State recorded by the NPM resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpmLockfileState {
    /// Resolved packages
    #[serde(default)]
    pub packages: Vec<NpmPackage>,
}

/// State from a contributor this crate has no dedicated type for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomState {
    /// Contributor-defined kind
    pub kind: String,
    /// Free-form payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Contributor-specific stanza payload, tagged by type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum StanzaState {
    /// Maven resolver state
    Maven(MavenLockfileState),
    /// NPM resolver state
    Npm(NpmLockfileState),
    /// Any other contributor's state
    Custom(CustomState),
}

/// Typed access into a [`StanzaState`]
pub trait TypedState: Sized {
    /// Borrow the payload if `state` holds this type
    fn from_state(state: &StanzaState) -> Option<&Self>;
}

impl TypedState for MavenLockfileState {
    fn from_state(state: &StanzaState) -> Option<&Self> {
        match state {
            StanzaState::Maven(inner) => Some(inner),
            _ => None,
        }
    }
}

impl TypedState for NpmLockfileState {
    fn from_state(state: &StanzaState) -> Option<&Self> {
        match state {
            StanzaState::Npm(inner) => Some(inner),
            _ => None,
        }
    }
}

impl TypedState for CustomState {
    fn from_state(state: &StanzaState) -> Option<&Self> {
        match state {
            StanzaState::Custom(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<MavenLockfileState> for StanzaState {
    fn from(state: MavenLockfileState) -> Self {
        Self::Maven(state)
    }
}

impl From<NpmLockfileState> for StanzaState {
    fn from(state: NpmLockfileState) -> Self {
        Self::Npm(state)
    }
}

impl From<CustomState> for StanzaState {
    fn from(state: CustomState) -> Self {
        Self::Custom(state)
    }
}

/// A named, fingerprinted chapter of a lockfile
///
/// `fingerprint` is whatever the contributor computed; it is not derived
/// from `inputs` here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    /// Unique key within one lockfile
    pub identifier: String,
    /// Producer name
    pub contributed_by: Option<String>,
    /// Inputs that fed this stanza
    pub inputs: BTreeSet<InputMaterial>,
    /// This stanza's own fingerprint
    pub fingerprint: Fingerprint,
    /// Free-text remarks
    pub remarks: Option<Remarks>,
    /// Contributor-specific payload
    pub state: Option<StanzaState>,
}

impl Stanza {
    /// Create a stanza with no inputs, remarks, or state
    pub fn new(identifier: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            identifier: identifier.into(),
            contributed_by: None,
            inputs: BTreeSet::new(),
            fingerprint,
            remarks: None,
            state: None,
        }
    }

    /// Set the producer name
    #[must_use]
    pub fn contributed_by(mut self, contributor: impl Into<String>) -> Self {
        self.contributed_by = Some(contributor.into());
        self
    }

    /// Add one input
    #[must_use]
    pub fn with_input(mut self, input: InputMaterial) -> Self {
        self.inputs.insert(input);
        self
    }

    /// Add several inputs
    #[must_use]
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = InputMaterial>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Attach remarks
    #[must_use]
    pub fn with_remarks(mut self, message: impl Into<String>) -> Self {
        self.remarks = Some(Remarks::new(message));
        self
    }

    /// Attach contributor state
    #[must_use]
    pub fn with_state(mut self, state: impl Into<StanzaState>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Borrow the state as a concrete type
    pub fn typed_state<T: TypedState>(&self) -> Option<&T> {
        self.state.as_ref().and_then(T::from_state)
    }
}

impl Fingerprint {
    /// Aggregate fingerprint over a set of stanzas
    pub fn from_stanzas<'a>(stanzas: impl IntoIterator<Item = &'a Stanza>) -> Self {
        Self::compound(stanzas.into_iter().map(|s| s.fingerprint.clone()))
    }
}
