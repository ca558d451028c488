//! Committish selection for browse URLs
//!
//! Explicit overrides win in the order `committish`, `commit`, `branch`,
//! `tag`. Without an override, a known version pins links to its release
//! tag when the working tree is that release (or the version is not
//! released yet). Otherwise the committish is empty and links follow the
//! default branch.

use serde::{Deserialize, Serialize};

use crate::provenance::error::ProvenanceError;

/// Committish overrides supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommittishOverrides {
    pub committish: Option<String>,
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
}

impl CommittishOverrides {
    /// The first non-empty override in priority order
    pub fn first(&self) -> Option<&str> {
        [&self.committish, &self.commit, &self.branch, &self.tag]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }
}

/// Policy deciding whether documentation of a version pins to its tag
#[async_trait::async_trait]
pub trait PinPolicy: Send + Sync {
    async fn should_pin_release(&self, version: &str) -> Result<bool, ProvenanceError>;
}

/// Name of the release tag for a version
pub fn release_tag_name(version: &str) -> String {
    format!("v{version}")
}

/// Map freshness to a pin decision
///
/// Only a known "not older" pins. An unknown freshness means the engine
/// could not verify the release, so links stay on the default branch.
pub fn pin_for_freshness(freshness: Option<bool>) -> bool {
    freshness == Some(false)
}

/// Choose the committish for browse URLs
pub async fn select_committish(
    policy: &dyn PinPolicy,
    overrides: &CommittishOverrides,
    version: Option<&str>,
) -> Result<String, ProvenanceError> {
    if let Some(committish) = overrides.first() {
        return Ok(committish.to_string());
    }

    let Some(version) = version.filter(|v| !v.is_empty()) else {
        return Ok(String::new());
    };

    if policy.should_pin_release(version).await? {
        Ok(release_tag_name(version))
    } else {
        Ok(String::new())
    }
}
