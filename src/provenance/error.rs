use std::sync::Arc;

use thiserror::Error;

use crate::hosting::HostingKind;

#[derive(Debug, Clone, Error)]
pub enum GitError {
    #[error("Failed to spawn `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` exited with code {}: {}", exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()), stderr.trim())]
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Ref {reference} not listed by show-ref")]
    RefMissing { reference: String },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },

    #[error("Unexpected response from {url}: field `{field}` was {value}")]
    Malformed {
        url: String,
        field: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("Fetching tags is not supported for {0} repositories")]
    Unsupported(HostingKind),

    #[error("Could not list tags of {repository}: {source}")]
    CatalogUnavailable {
        repository: String,
        #[source]
        source: GitError,
    },

    #[error("Could not resolve the commit of tag {tag}: {source}")]
    TagCommitUnresolved {
        tag: String,
        #[source]
        source: GitError,
    },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// An error replayed from a memoized operation
    #[error(transparent)]
    Shared(#[from] Arc<ProvenanceError>),
}

impl ProvenanceError {
    /// Follow replayed errors down to the original failure
    pub fn root(&self) -> &ProvenanceError {
        match self {
            ProvenanceError::Shared(inner) => inner.root(),
            other => other,
        }
    }
}
