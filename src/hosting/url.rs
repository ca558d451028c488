//! Repository URL parser
//!
//! Turns the `repository` field of package metadata into a
//! [`HostingDescriptor`]. Supported forms:
//! - Full URLs: `https://github.com/owner/project.git`, `git+https://...`,
//!   `git://...`, `ssh://git@host/...`
//! - scp-style: `git@github.com:owner/project.git`
//! - Shorthands: `owner/project`, `github:owner/project`, `gitlab:group/project`,
//!   `bitbucket:owner/project`, `gist:id`

use regex::Regex;
use thiserror::Error;

use crate::hosting::types::{HostingDescriptor, HostingKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostingParseError {
    #[error("Unrecognized repository URL: {0}")]
    Unrecognized(String),

    #[error("Unsupported repository host: {0}")]
    UnknownHost(String),
}

/// Parser for repository URLs
pub struct RepositoryUrlParser {
    /// Regex for `provider:path` shorthands
    shorthand_re: Regex,
    /// Regex for `scheme://[user@]host[:port]/path`
    url_re: Regex,
    /// Regex for scp-style `[user@]host:path`
    scp_re: Regex,
    /// Regex for bare `owner/project`
    bare_re: Regex,
}

impl RepositoryUrlParser {
    pub fn new() -> Self {
        Self {
            // Match: github:owner/project
            shorthand_re: Regex::new(r"^(github|gitlab|bitbucket|gist):(.+)$").unwrap(),
            // Match: https://user@host:443/owner/project
            url_re: Regex::new(r"^(?:git\+)?(?:https?|git|ssh)://(?:[^@/]+@)?([^/:]+)(?::\d+)?/(.+)$")
                .unwrap(),
            // Match: git@host:owner/project
            scp_re: Regex::new(r"^(?:[\w.-]+@)?([\w.-]+\.[\w-]+):([^/].*)$").unwrap(),
            // Match: owner/project
            bare_re: Regex::new(r"^[\w.-]+/[\w.-]+$").unwrap(),
        }
    }

    pub fn parse(&self, input: &str) -> Result<HostingDescriptor, HostingParseError> {
        let trimmed = input.trim();
        let unrecognized = || HostingParseError::Unrecognized(input.to_string());

        if let Some(caps) = self.shorthand_re.captures(trimmed) {
            let kind = caps[1].parse::<HostingKind>().map_err(|_| unrecognized())?;
            return descriptor_from_path(kind, &caps[2]).ok_or_else(unrecognized);
        }

        let (host, path) = if let Some(caps) = self.url_re.captures(trimmed) {
            (caps[1].to_string(), caps[2].to_string())
        } else if let Some(caps) = self.scp_re.captures(trimmed) {
            (caps[1].to_string(), caps[2].to_string())
        } else if self.bare_re.is_match(trimmed) {
            (HostingKind::GitHub.domain().to_string(), trimmed.to_string())
        } else {
            return Err(unrecognized());
        };

        let kind =
            HostingKind::from_domain(&host).ok_or(HostingParseError::UnknownHost(host))?;
        descriptor_from_path(kind, &path).ok_or_else(unrecognized)
    }
}

impl Default for RepositoryUrlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for HostingDescriptor {
    type Err = HostingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepositoryUrlParser::new().parse(s)
    }
}

/// Split a repository path into owner and project for the given provider
fn descriptor_from_path(kind: HostingKind, path: &str) -> Option<HostingDescriptor> {
    // Drop `#committish` and `?query` suffixes
    let path = path.split(['#', '?']).next().unwrap_or_default();
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match kind {
        HostingKind::Gist => {
            // gist.github.com/[owner/]id
            let project = segments.last()?;
            let owner = if segments.len() > 1 { segments[0] } else { "" };
            Some(HostingDescriptor::new(kind, owner, *project))
        }
        HostingKind::GitLab => {
            // Subgroups are part of the namespace; `/-/` starts a web route
            let end = segments
                .iter()
                .position(|s| *s == "-")
                .unwrap_or(segments.len());
            let segments = &segments[..end];
            if segments.len() < 2 {
                return None;
            }
            let (project, namespace) = segments.split_last()?;
            Some(HostingDescriptor::new(kind, namespace.join("/"), *project))
        }
        HostingKind::GitHub | HostingKind::Bitbucket => {
            if segments.len() < 2 {
                return None;
            }
            Some(HostingDescriptor::new(kind, segments[0], segments[1]))
        }
    }
}
