//! Test doubles for the git transport and hosting API

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use readme_provenance::hosting::{HostingDescriptor, HostingKind};
use readme_provenance::provenance::Provenance;
use readme_provenance::provenance::api::{TagApi, TagRef};
use readme_provenance::provenance::error::{ApiError, GitError, ProvenanceError};
use readme_provenance::provenance::git::GitRunner;

pub const HEAD: &str = "1111111111111111111111111111111111111111";

/// Scripted git with per-subcommand call counts
///
/// Each subcommand (`rev-parse`, `ls-remote`, `show-ref`) answers with its
/// scripted output, or fails with exit code 128 when none is scripted.
#[derive(Default)]
pub struct FakeGit {
    outputs: HashMap<String, String>,
    calls: HashMap<String, AtomicUsize>,
}

impl FakeGit {
    pub fn new() -> Self {
        let mut git = Self::default();
        for subcommand in ["rev-parse", "ls-remote", "show-ref"] {
            git.calls.insert(subcommand.to_string(), AtomicUsize::new(0));
        }
        git
    }

    pub fn with_head(self, head: &str) -> Self {
        self.with_output("rev-parse", &format!("{head}\n"))
    }

    pub fn with_output(mut self, subcommand: &str, output: &str) -> Self {
        self.outputs
            .insert(subcommand.to_string(), output.to_string());
        self
    }

    pub fn calls(&self, subcommand: &str) -> usize {
        self.calls[subcommand].load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, args: &[String]) -> Result<String, GitError> {
        let subcommand = args.first().cloned().unwrap_or_default();
        if let Some(count) = self.calls.get(&subcommand) {
            count.fetch_add(1, Ordering::SeqCst);
        }
        // Let concurrent callers pile up behind the first one
        tokio::time::sleep(Duration::from_millis(10)).await;

        self.outputs
            .get(&subcommand)
            .cloned()
            .ok_or_else(|| GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: format!("fatal: {subcommand} unavailable"),
                exit_code: Some(128),
            })
    }
}

/// Scripted hosting API with call counts
#[derive(Default)]
pub struct FakeApi {
    refs: Option<Vec<TagRef>>,
    tag_commits: HashMap<String, String>,
    pub list_calls: AtomicUsize,
    pub tag_commit_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, tag_sha: &str, commit: &str) -> Self {
        self.refs.get_or_insert_with(Vec::new).push(TagRef {
            raw_ref: format!("refs/tags/{name}"),
            sha: tag_sha.to_string(),
        });
        self.tag_commits
            .insert(tag_sha.to_string(), commit.to_string());
        self
    }

    /// List a tag whose object the API cannot dereference
    pub fn with_unresolvable_tag(mut self, name: &str, tag_sha: &str) -> Self {
        self.refs.get_or_insert_with(Vec::new).push(TagRef {
            raw_ref: format!("refs/tags/{name}"),
            sha: tag_sha.to_string(),
        });
        self
    }
}

#[async_trait]
impl TagApi for FakeApi {
    async fn list_tag_refs(
        &self,
        _repository: &HostingDescriptor,
    ) -> Result<Vec<TagRef>, ProvenanceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.refs.clone().ok_or_else(|| {
            ProvenanceError::Api(ApiError::Status {
                url: "https://api.github.com/repos/owner/project/git/refs/tags".to_string(),
                status: 404,
                headers: vec![],
                body: r#"{"message": "Not Found"}"#.to_string(),
            })
        })
    }

    async fn tag_commit(
        &self,
        _repository: &HostingDescriptor,
        tag_sha: &str,
    ) -> Result<String, ProvenanceError> {
        self.tag_commit_calls.fetch_add(1, Ordering::SeqCst);
        self.tag_commits.get(tag_sha).cloned().ok_or_else(|| {
            ProvenanceError::Api(ApiError::Malformed {
                url: format!("https://api.github.com/repos/owner/project/git/tags/{tag_sha}"),
                field: "object.sha".to_string(),
                value: "null".to_string(),
            })
        })
    }
}

pub fn github_repository() -> HostingDescriptor {
    HostingDescriptor::new(HostingKind::GitHub, "owner", "project")
}

/// Engine over shared fakes, so tests can inspect call counts afterwards
pub fn create_engine(git: &Arc<FakeGit>, api: &Arc<FakeApi>) -> Provenance {
    Provenance::new(github_repository(), git.clone(), api.clone())
}
