//! Lockfile contributors
//!
//! Each contributor owns one stanza. The host application registers the
//! contributors it ships in a [`ContributorRegistry`] and hands the registry
//! to whatever builds the lockfile.

use std::fmt;
use std::sync::Arc;

use super::lockfile::{Lockfile, Version};
use super::project::Project;
use super::stanza::Stanza;
use crate::error::LockfileError;

/// Supplies one stanza's worth of lockfile data
pub trait LockfileContributor: Send + Sync {
    /// Name recorded as the stanza's producer
    fn name(&self) -> &str;

    /// Contribute a stanza, or `None` when there is nothing to record
    fn contribute(&self, project: &Project) -> Result<Option<Stanza>, LockfileError>;
}

/// Explicit set of installed contributors
#[derive(Clone, Default)]
pub struct ContributorRegistry {
    contributors: Vec<Arc<dyn LockfileContributor>>,
}

impl fmt::Debug for ContributorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.contributors.iter().map(|c| c.name()))
            .finish()
    }
}

impl ContributorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a contributor
    pub fn register(&mut self, contributor: Arc<dyn LockfileContributor>) {
        tracing::debug!("Registered lockfile contributor '{}'", contributor.name());
        self.contributors.push(contributor);
    }

    /// Install a contributor, builder style
    #[must_use]
    pub fn with(mut self, contributor: Arc<dyn LockfileContributor>) -> Self {
        self.register(contributor);
        self
    }

    /// Number of installed contributors
    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    /// Whether no contributors are installed
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    /// Installed contributors, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LockfileContributor>> {
        self.contributors.iter()
    }

    /// Ask every contributor for its stanza
    ///
    /// A stanza without a producer name is stamped with the contributor's.
    pub fn collect_stanzas(&self, project: &Project) -> Result<Vec<Stanza>, LockfileError> {
        let mut stanzas = Vec::new();
        for contributor in &self.contributors {
            match contributor.contribute(project)? {
                Some(mut stanza) => {
                    if stanza.contributed_by.is_none() {
                        stanza.contributed_by = Some(contributor.name().to_string());
                    }
                    tracing::debug!(
                        "Contributor '{}' supplied stanza '{}'",
                        contributor.name(),
                        stanza.identifier
                    );
                    stanzas.push(stanza);
                }
                None => tracing::debug!("Contributor '{}' had nothing to add", contributor.name()),
            }
        }
        Ok(stanzas)
    }

    /// Build a lockfile of `version` from every contributor's stanza
    pub fn build_lockfile(
        &self,
        project: &Project,
        version: Version,
    ) -> Result<Lockfile, LockfileError> {
        let stanzas = self.collect_stanzas(project)?;
        Ok(Lockfile::new(version, stanzas))
    }
}
