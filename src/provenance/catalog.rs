//! Tag catalog: released versions of a repository
//!
//! The catalog is built once from `git ls-remote --tags`, or from the
//! hosting API when the local transport fails. It maps the normalized
//! semantic version ("1.2.3") to the [`ReleaseTag`] published for it.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::provenance::error::ProvenanceError;
use crate::provenance::git::git_args;
use crate::provenance::listing::{ListedRef, ListedTag, collect_tags, parse_listing, tag_version};
use crate::provenance::tag::{ReleaseTag, TagSources};

/// How the SHA of a plain (non-peeled) listing line is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingOrigin {
    /// `git ls-remote` prints a peeled line for every annotated tag, so a
    /// plain line without one is a lightweight tag pointing at a commit
    Transport,
    /// The hosting API never peels, so a plain SHA may be a tag object
    Api,
}

#[derive(Debug)]
pub struct TagCatalog {
    tags: IndexMap<String, ReleaseTag>,
}

impl TagCatalog {
    /// Build a catalog keyed by each tag's version
    pub fn new(tags: impl IntoIterator<Item = ReleaseTag>) -> Self {
        let mut map = IndexMap::new();
        for tag in tags {
            map.entry(tag.version().to_string()).or_insert(tag);
        }
        Self { tags: map }
    }

    /// List the repository's tags
    ///
    /// # Returns
    /// * `Ok(TagCatalog)` - From the local transport, or from the API fallback
    /// * `Err(ProvenanceError::CatalogUnavailable)` - Both failed; carries the
    ///   local failure, which has the more useful diagnostics
    pub async fn fetch(sources: Arc<TagSources>) -> Result<Self, ProvenanceError> {
        let transport_url = sources.repository.transport_url();
        let args = git_args(["ls-remote", "--tags", transport_url.as_str()]);

        let local_error = match sources.git.run(&args).await {
            Ok(output) => {
                let catalog =
                    Self::from_listing(parse_listing(&output), ListingOrigin::Transport, &sources);
                info!(
                    "Listed {} release tags of {} via git",
                    catalog.len(),
                    sources.repository
                );
                return Ok(catalog);
            }
            Err(e) => e,
        };
        debug!(
            "git ls-remote failed for {}, falling back to API: {}",
            sources.repository, local_error
        );

        match sources.api.list_tag_refs(&sources.repository).await {
            Ok(refs) => {
                let listed = collect_tags(
                    refs.into_iter()
                        .map(|tag_ref| ListedRef::new(tag_ref.sha, &tag_ref.raw_ref)),
                );
                let catalog = Self::from_listing(listed, ListingOrigin::Api, &sources);
                info!(
                    "Listed {} release tags of {} via API",
                    catalog.len(),
                    sources.repository
                );
                Ok(catalog)
            }
            Err(api_error) => {
                debug!(
                    "API tag listing failed for {}: {}",
                    sources.repository, api_error
                );
                Err(ProvenanceError::CatalogUnavailable {
                    repository: sources.repository.to_string(),
                    source: local_error,
                })
            }
        }
    }

    fn from_listing(
        listed: IndexMap<String, ListedTag>,
        origin: ListingOrigin,
        sources: &Arc<TagSources>,
    ) -> Self {
        let tags = listed.into_values().filter_map(|tag| {
            let commit = match (origin, &tag.peeled) {
                (_, Some(peeled)) => Some(peeled.clone()),
                (ListingOrigin::Transport, None) => tag.sha.clone(),
                (ListingOrigin::Api, None) => None,
            };
            if tag.sha.is_none() && commit.is_none() {
                return None;
            }
            Some(ReleaseTag::new(
                tag.name,
                tag.version,
                tag.sha,
                commit,
                sources.clone(),
            ))
        });
        Self::new(tags)
    }

    /// Look up the tag released for a version
    ///
    /// Accepts the version with or without a `v` prefix.
    pub fn get(&self, version: &str) -> Option<&ReleaseTag> {
        match tag_version(version) {
            Some(parsed) => self.tags.get(&parsed.to_string()),
            None => self.tags.get(version),
        }
    }

    pub fn contains(&self, version: &str) -> bool {
        self.get(version).is_some()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in listing order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReleaseTag)> {
        self.tags.iter().map(|(version, tag)| (version.as_str(), tag))
    }
}
