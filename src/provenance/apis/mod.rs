//! Hosting API implementations

pub mod github;

pub use github::GitHubApi;

use crate::config::ApiConfig;
use crate::hosting::{HostingDescriptor, HostingKind};
use crate::provenance::api::{TagApi, TagRef};
use crate::provenance::error::{ApiError, ProvenanceError};

/// Dispatches to the API implementation of the repository's provider
///
/// Only GitHub has an implementation; every other provider is reported as
/// [`ProvenanceError::Unsupported`].
pub struct HostingApi {
    github: GitHubApi,
}

impl HostingApi {
    pub fn new(github: GitHubApi) -> Self {
        Self { github }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::new(GitHubApi::from_config(config)?))
    }
}

#[async_trait::async_trait]
impl TagApi for HostingApi {
    async fn list_tag_refs(
        &self,
        repository: &HostingDescriptor,
    ) -> Result<Vec<TagRef>, ProvenanceError> {
        match repository.kind {
            HostingKind::GitHub => Ok(self
                .github
                .list_tag_refs(&repository.owner, &repository.project)
                .await?),
            kind => Err(ProvenanceError::Unsupported(kind)),
        }
    }

    async fn tag_commit(
        &self,
        repository: &HostingDescriptor,
        tag_sha: &str,
    ) -> Result<String, ProvenanceError> {
        match repository.kind {
            HostingKind::GitHub => Ok(self
                .github
                .tag_commit(&repository.owner, &repository.project, tag_sha)
                .await?),
            kind => Err(ProvenanceError::Unsupported(kind)),
        }
    }
}
