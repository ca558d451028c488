//! Published release tags and lazy commit resolution

use std::sync::Arc;

use semver::Version;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::hosting::HostingDescriptor;
use crate::provenance::api::TagApi;
use crate::provenance::error::{GitError, ProvenanceError};
use crate::provenance::git::{GitRunner, git_args};
use crate::provenance::listing::parse_ref_line;

/// Where tag information comes from: the local git transport first, the
/// hosting API second
pub struct TagSources {
    pub repository: HostingDescriptor,
    pub git: Arc<dyn GitRunner>,
    pub api: Arc<dyn TagApi>,
}

impl TagSources {
    pub fn new(
        repository: HostingDescriptor,
        git: Arc<dyn GitRunner>,
        api: Arc<dyn TagApi>,
    ) -> Self {
        Self {
            repository,
            git,
            api,
        }
    }
}

/// One published tag of the repository
///
/// Catalog tags know at least one of the tag object SHA and the commit SHA.
/// A tag known by name only can still be resolved through the local
/// transport. The commit is resolved on demand, at most once; the outcome,
/// failure included, is kept for the lifetime of the tag.
pub struct ReleaseTag {
    name: String,
    version: Version,
    tag_sha: Option<String>,
    commit: OnceCell<Result<String, Arc<ProvenanceError>>>,
    sources: Arc<TagSources>,
}

impl ReleaseTag {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        tag_sha: Option<String>,
        commit_sha: Option<String>,
        sources: Arc<TagSources>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            tag_sha,
            commit: OnceCell::new_with(commit_sha.map(Ok)),
            sources,
        }
    }

    /// Tag name (e.g. "v1.2.3")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// SHA of the tag object itself (equals the commit for lightweight tags)
    pub fn tag_sha(&self) -> Option<&str> {
        self.tag_sha.as_deref()
    }

    /// The commit if it is already known, without resolving it
    pub fn commit(&self) -> Option<&str> {
        self.commit
            .get()
            .and_then(|outcome| outcome.as_deref().ok())
    }

    fn raw_ref(&self) -> String {
        format!("refs/tags/{}", self.name)
    }

    /// Resolve the commit this tag points to
    ///
    /// Tries `git show-ref --dereference` first and the hosting API second.
    /// Every caller, concurrent or later, shares the first outcome; a failure
    /// is replayed as [`ProvenanceError::Shared`].
    pub async fn resolve_commit(&self) -> Result<String, ProvenanceError> {
        let outcome = self
            .commit
            .get_or_init(|| async { self.lookup_commit().await.map_err(Arc::new) })
            .await;
        Ok(outcome.clone()?)
    }

    async fn lookup_commit(&self) -> Result<String, ProvenanceError> {
        let local_error = match self.local_commit().await {
            Ok(commit) => return Ok(commit),
            Err(e) => e,
        };
        let Some(tag_sha) = &self.tag_sha else {
            return Err(ProvenanceError::TagCommitUnresolved {
                tag: self.name.clone(),
                source: local_error,
            });
        };
        debug!(
            "Tag {} not resolvable locally, asking {} API: {}",
            self.name, self.sources.repository.kind, local_error
        );

        self.sources
            .api
            .tag_commit(&self.sources.repository, tag_sha)
            .await
    }

    async fn local_commit(&self) -> Result<String, GitError> {
        let raw_ref = self.raw_ref();
        let args = git_args(["show-ref", "--dereference", raw_ref.as_str()]);
        let output = self.sources.git.run(&args).await?;

        let refs: Vec<_> = output
            .lines()
            .filter_map(parse_ref_line)
            .filter(|listed| listed.raw_ref == raw_ref)
            .collect();

        // Annotated tags list the peeled commit; lightweight tags only the ref
        refs.iter()
            .find(|listed| listed.peeled)
            .or_else(|| refs.first())
            .map(|listed| listed.sha.clone())
            .ok_or(GitError::RefMissing { reference: raw_ref })
    }
}

impl std::fmt::Debug for ReleaseTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseTag")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("tag_sha", &self.tag_sha)
            .field("commit", &self.commit())
            .finish()
    }
}
