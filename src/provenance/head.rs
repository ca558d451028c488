//! HEAD commit resolution

use std::convert::Infallible;
use std::sync::Arc;

use tracing::debug;

use crate::provenance::git::{GitRunner, git_args};
use crate::provenance::single_flight::SingleFlight;

/// Resolves the commit checked out in the working directory, once
///
/// A missing repository or a repository without commits is not an error:
/// the resolver reports `None` and callers proceed without that fact.
pub struct CommitResolver {
    head: SingleFlight<Option<String>, Infallible>,
}

impl CommitResolver {
    pub fn new(git: Arc<dyn GitRunner>) -> Self {
        Self {
            head: SingleFlight::new(move || {
                let git = git.clone();
                async move { Ok::<_, Infallible>(read_head(git.as_ref()).await) }
            }),
        }
    }

    pub async fn resolve(&self) -> Option<String> {
        self.head.get().await.unwrap_or_default()
    }
}

async fn read_head(git: &dyn GitRunner) -> Option<String> {
    match git.run(&git_args(["rev-parse", "--verify", "HEAD"])).await {
        Ok(output) => {
            let sha = output.trim();
            (!sha.is_empty()).then(|| sha.to_string())
        }
        Err(e) => {
            debug!("No HEAD commit available: {}", e);
            None
        }
    }
}
