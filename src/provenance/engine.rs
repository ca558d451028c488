//! Provenance engine
//!
//! One [`Provenance`] per process (or per rendered document) owns the
//! memoized facts about a hosted repository. Every operation is safe to call
//! any number of times from any number of tasks: HEAD is read once, the tag
//! catalog is fetched once, and each tag's commit and each pin decision is
//! resolved once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::ProvenanceConfig;
use crate::hosting::HostingDescriptor;
use crate::provenance::api::TagApi;
use crate::provenance::apis::HostingApi;
use crate::provenance::catalog::TagCatalog;
use crate::provenance::committish::{
    CommittishOverrides, PinPolicy, pin_for_freshness, select_committish,
};
use crate::provenance::error::ProvenanceError;
use crate::provenance::freshness::{ReleaseFacts, is_older_released_version};
use crate::provenance::git::{GitRunner, SystemGit};
use crate::provenance::head::CommitResolver;
use crate::provenance::single_flight::SingleFlight;
use crate::provenance::tag::TagSources;

type PinDecision = Arc<SingleFlight<bool, ProvenanceError>>;

/// Memoized HEAD and tag catalog
struct CachedFacts {
    sources: Arc<TagSources>,
    head: CommitResolver,
    catalog: SingleFlight<Arc<TagCatalog>, ProvenanceError>,
}

#[async_trait::async_trait]
impl ReleaseFacts for CachedFacts {
    async fn head_commit(&self) -> Option<String> {
        self.head.resolve().await
    }

    async fn tag_catalog(&self) -> Result<Arc<TagCatalog>, ProvenanceError> {
        Ok(self.catalog.get().await?)
    }
}

pub struct Provenance {
    facts: Arc<CachedFacts>,
    pin_decisions: Mutex<HashMap<String, PinDecision>>,
}

impl Provenance {
    pub fn new(
        repository: HostingDescriptor,
        git: Arc<dyn GitRunner>,
        api: Arc<dyn TagApi>,
    ) -> Self {
        let sources = Arc::new(TagSources::new(repository, git.clone(), api));

        let catalog_sources = sources.clone();
        let catalog = SingleFlight::new(move || {
            let sources = catalog_sources.clone();
            async move { TagCatalog::fetch(sources).await.map(Arc::new) }
        });

        Self {
            facts: Arc::new(CachedFacts {
                sources,
                head: CommitResolver::new(git),
                catalog,
            }),
            pin_decisions: Mutex::new(HashMap::new()),
        }
    }

    /// Build an engine using the system git and the hosting REST APIs
    pub fn from_config(
        repository: HostingDescriptor,
        config: &ProvenanceConfig,
    ) -> Result<Self, ProvenanceError> {
        let git = SystemGit::from_config(&config.git);
        let api = HostingApi::from_config(&config.api)?;
        Ok(Self::new(repository, Arc::new(git), Arc::new(api)))
    }

    pub fn repository(&self) -> &HostingDescriptor {
        &self.facts.sources.repository
    }

    /// Released versions of the repository, fetched once
    pub async fn fetch_tag_catalog(&self) -> Result<Arc<TagCatalog>, ProvenanceError> {
        self.facts.tag_catalog().await
    }

    /// HEAD commit of the working directory, resolved once
    pub async fn resolve_head_commit(&self) -> Option<String> {
        self.facts.head_commit().await
    }

    /// Whether `version` was released from a commit other than HEAD
    ///
    /// `None` when HEAD or the tag catalog is unavailable.
    pub async fn is_older_released_version(
        &self,
        version: &str,
    ) -> Result<Option<bool>, ProvenanceError> {
        is_older_released_version(self.facts.as_ref(), version).await
    }

    /// Committish for browse URLs of this repository
    pub async fn select_committish(
        &self,
        overrides: &CommittishOverrides,
        version: Option<&str>,
    ) -> Result<String, ProvenanceError> {
        select_committish(self, overrides, version).await
    }

    fn pin_decision(&self, version: &str) -> PinDecision {
        let mut decisions = self
            .pin_decisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        decisions
            .entry(version.to_string())
            .or_insert_with(|| {
                let facts = self.facts.clone();
                let version = version.to_string();
                Arc::new(SingleFlight::new(move || {
                    let facts = facts.clone();
                    let version = version.clone();
                    async move {
                        let freshness =
                            is_older_released_version(facts.as_ref(), &version).await?;
                        let pin = pin_for_freshness(freshness);
                        debug!(
                            "Release {} freshness {:?}, pinning: {}",
                            version, freshness, pin
                        );
                        Ok::<bool, ProvenanceError>(pin)
                    }
                }))
            })
            .clone()
    }
}

#[async_trait::async_trait]
impl PinPolicy for Provenance {
    async fn should_pin_release(&self, version: &str) -> Result<bool, ProvenanceError> {
        let decision = self.pin_decision(version);
        Ok(decision.get().await?)
    }
}
