//! Resolved facts for one README render
//!
//! Collects every fact the templates use from a [`Provenance`] engine. The
//! facts are requested concurrently, the way independent template filters
//! request them; the engine's memoization keeps that to one git or API call
//! per fact. Failures are kept per fact, prefixed with the fact's name.

use serde::Serialize;

use crate::provenance::{CommittishOverrides, Provenance};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub version: String,
    pub name: String,
    pub tag_sha: Option<String>,
    /// Commit if known without further lookups
    pub commit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub repository: String,
    pub version: Option<String>,
    pub head: Option<String>,
    pub tags: Vec<TagSummary>,
    pub older_release: Option<bool>,
    pub committish: String,
    pub browse_url: String,
    pub errors: Vec<String>,
}

impl Report {
    pub async fn collect(
        engine: &Provenance,
        overrides: &CommittishOverrides,
        version: Option<&str>,
    ) -> Self {
        let older = async {
            match version {
                Some(version) => engine.is_older_released_version(version).await,
                None => Ok(None),
            }
        };

        let (head, catalog, older, committish) = tokio::join!(
            engine.resolve_head_commit(),
            engine.fetch_tag_catalog(),
            older,
            engine.select_committish(overrides, version),
        );

        let mut errors = Vec::new();

        let tags = match catalog {
            Ok(catalog) => catalog
                .iter()
                .map(|(version, tag)| TagSummary {
                    version: version.to_string(),
                    name: tag.name().to_string(),
                    tag_sha: tag.tag_sha().map(str::to_string),
                    commit: tag.commit().map(str::to_string),
                })
                .collect(),
            Err(e) => {
                errors.push(format!("tags: {e}"));
                Vec::new()
            }
        };

        let older_release = older.unwrap_or_else(|e| {
            errors.push(format!("olderRelease: {e}"));
            None
        });

        let committish = committish.unwrap_or_else(|e| {
            errors.push(format!("committish: {e}"));
            String::new()
        });

        let repository = engine.repository();
        Self {
            repository: repository.to_string(),
            version: version.map(str::to_string),
            head,
            tags,
            older_release,
            browse_url: repository.browse_url(&committish),
            committish,
            errors,
        }
    }

    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("repository: {}\n", self.repository));
        out.push_str(&format!(
            "version:    {}\n",
            self.version.as_deref().unwrap_or("(none)")
        ));
        out.push_str(&format!(
            "head:       {}\n",
            self.head.as_deref().unwrap_or("(unavailable)")
        ));
        out.push_str(&format!("tags:       {}\n", self.tags.len()));
        for tag in &self.tags {
            out.push_str(&format!(
                "  {:<16} {:<20} {}\n",
                tag.version,
                tag.name,
                tag.commit.as_deref().unwrap_or("(commit unresolved)")
            ));
        }
        let older = match self.older_release {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        };
        out.push_str(&format!("older:      {}\n", older));
        let committish = if self.committish.is_empty() {
            "(default branch)"
        } else {
            &self.committish
        };
        out.push_str(&format!("committish: {}\n", committish));
        out.push_str(&format!("browse:     {}\n", self.browse_url));
        out
    }
}
