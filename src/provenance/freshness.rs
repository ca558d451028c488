//! Whether a released version is older than the working tree
//!
//! The answer is three-valued: `Some(true)` when HEAD moved past the
//! release, `Some(false)` when HEAD is the release or the version was never
//! released, and `None` when HEAD or the tag catalog is unavailable.

use std::sync::Arc;

use tracing::debug;

use crate::provenance::catalog::TagCatalog;
use crate::provenance::error::ProvenanceError;

/// Source of the memoized facts the freshness check needs
#[async_trait::async_trait]
pub trait ReleaseFacts: Send + Sync {
    /// HEAD commit, or None without a repository or commits
    async fn head_commit(&self) -> Option<String>;

    /// Tag catalog of the hosted repository
    async fn tag_catalog(&self) -> Result<Arc<TagCatalog>, ProvenanceError>;
}

/// Decide whether `version` was released from a commit other than HEAD
///
/// HEAD is consulted first so that a missing repository never costs a
/// network round trip. Failing to resolve the commit of an existing tag is
/// returned as an error.
pub async fn is_older_released_version(
    facts: &dyn ReleaseFacts,
    version: &str,
) -> Result<Option<bool>, ProvenanceError> {
    let Some(head) = facts.head_commit().await else {
        return Ok(None);
    };

    let catalog = match facts.tag_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            debug!("Tag catalog unavailable, freshness of {} unknown: {}", version, e);
            return Ok(None);
        }
    };

    let Some(tag) = catalog.get(version) else {
        return Ok(Some(false));
    };

    let commit = tag.resolve_commit().await?;
    Ok(Some(commit != head))
}
