//! Validated migration chains.

use super::error::MigrationError;
use super::revision::{Revision, RevisionId};
use std::collections::HashMap;

/// An ordered, validated chain of revisions.
///
/// Construction enforces the chain invariants: at most one root (empty
/// down-revision), every parent reference resolves, no duplicate ids, no
/// forks, no cycles. The result is a single path from root to head.
#[derive(Debug, Clone, Default)]
pub struct MigrationChain {
    ordered: Vec<Revision>,
}

impl MigrationChain {
    /// Builds a chain from revisions in any order.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant: [`MigrationError::DuplicateRevision`],
    /// [`MigrationError::MissingRoot`], [`MigrationError::MultipleRoots`],
    /// [`MigrationError::UnknownParent`], [`MigrationError::Fork`], or
    /// [`MigrationError::Cycle`].
    pub fn from_revisions(revisions: Vec<Revision>) -> Result<Self, MigrationError> {
        if revisions.is_empty() {
            return Ok(Self::default());
        }

        let mut by_id: HashMap<RevisionId, Revision> = HashMap::with_capacity(revisions.len());
        for revision in revisions {
            if by_id.contains_key(revision.id()) {
                return Err(MigrationError::DuplicateRevision(revision.id().clone()));
            }
            by_id.insert(revision.id().clone(), revision);
        }

        let mut child_of: HashMap<RevisionId, RevisionId> = HashMap::new();
        let mut root: Option<RevisionId> = None;
        for revision in by_id.values() {
            match revision.down_revision() {
                None => {
                    if root.is_some() {
                        return Err(MigrationError::MultipleRoots);
                    }
                    root = Some(revision.id().clone());
                }
                Some(parent) => {
                    if !by_id.contains_key(parent) {
                        return Err(MigrationError::UnknownParent {
                            id: revision.id().clone(),
                            parent: parent.clone(),
                        });
                    }
                    if child_of
                        .insert(parent.clone(), revision.id().clone())
                        .is_some()
                    {
                        return Err(MigrationError::Fork {
                            parent: parent.clone(),
                        });
                    }
                }
            }
        }
        let Some(root_id) = root else {
            return Err(MigrationError::MissingRoot);
        };

        let mut ordered = Vec::with_capacity(by_id.len());
        let mut cursor = Some(root_id);
        while let Some(current) = cursor {
            let Some(revision) = by_id.remove(&current) else {
                break;
            };
            cursor = child_of.get(revision.id()).cloned();
            ordered.push(revision);
        }
        // Anything still unvisited has all parents present but is
        // unreachable from the root, which means it loops on itself.
        if !by_id.is_empty() {
            return Err(MigrationError::Cycle);
        }

        Ok(Self { ordered })
    }

    /// Returns the revisions in root-to-head order.
    #[must_use]
    pub fn ordered(&self) -> &[Revision] {
        &self.ordered
    }

    /// Returns the head revision, if the chain is non-empty.
    #[must_use]
    pub fn head(&self) -> Option<&Revision> {
        self.ordered.last()
    }

    /// Returns the number of revisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Reports whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Returns the revisions that follow `current` in chain order; all of
    /// them when `current` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::UnknownApplied`] when `current` is not in
    /// the chain.
    pub fn pending_after(
        &self,
        current: Option<&RevisionId>,
    ) -> Result<&[Revision], MigrationError> {
        let Some(current_id) = current else {
            return Ok(&self.ordered);
        };
        let position = self
            .ordered
            .iter()
            .position(|revision| revision.id() == current_id)
            .ok_or_else(|| MigrationError::UnknownApplied {
                revision: current_id.to_string(),
            })?;
        Ok(self.ordered.get(position + 1..).unwrap_or_default())
    }
}
