//! Common types for hosted repositories

use serde::Serialize;

/// Hosting provider of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingKind {
    /// github.com
    GitHub,
    /// gitlab.com
    GitLab,
    /// bitbucket.org
    Bitbucket,
    /// gist.github.com
    Gist,
}

impl HostingKind {
    /// Returns the string representation of the hosting kind
    pub fn as_str(&self) -> &'static str {
        match self {
            HostingKind::GitHub => "github",
            HostingKind::GitLab => "gitlab",
            HostingKind::Bitbucket => "bitbucket",
            HostingKind::Gist => "gist",
        }
    }

    /// Returns the web domain of the provider
    pub fn domain(&self) -> &'static str {
        match self {
            HostingKind::GitHub => "github.com",
            HostingKind::GitLab => "gitlab.com",
            HostingKind::Bitbucket => "bitbucket.org",
            HostingKind::Gist => "gist.github.com",
        }
    }

    /// Detect the provider from a host name
    pub fn from_domain(host: &str) -> Option<Self> {
        let host = host.strip_prefix("www.").unwrap_or(host);
        [
            HostingKind::GitHub,
            HostingKind::GitLab,
            HostingKind::Bitbucket,
            HostingKind::Gist,
        ]
        .into_iter()
        .find(|kind| kind.domain().eq_ignore_ascii_case(host))
    }
}

impl std::fmt::Display for HostingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HostingKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(HostingKind::GitHub),
            "gitlab" => Ok(HostingKind::GitLab),
            "bitbucket" => Ok(HostingKind::Bitbucket),
            "gist" => Ok(HostingKind::Gist),
            _ => Err(()),
        }
    }
}

/// A repository on a hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostingDescriptor {
    /// Provider the repository lives on
    pub kind: HostingKind,
    /// Owner or namespace (may be empty for anonymous gists)
    pub owner: String,
    /// Project name (the gist id for gists)
    pub project: String,
}

impl HostingDescriptor {
    pub fn new(kind: HostingKind, owner: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
            project: project.into(),
        }
    }

    /// `owner/project`, or just the id for gists
    pub fn path(&self) -> String {
        match self.kind {
            HostingKind::Gist => self.project.clone(),
            _ => format!("{}/{}", self.owner, self.project),
        }
    }

    /// URL usable by `git ls-remote` without a local clone
    pub fn transport_url(&self) -> String {
        format!("https://{}/{}.git", self.kind.domain(), self.path())
    }

    /// Web URL of the repository, optionally at a committish.
    ///
    /// An empty committish yields the repository home page, which follows
    /// the provider's default branch.
    pub fn browse_url(&self, committish: &str) -> String {
        let base = format!("https://{}/{}", self.kind.domain(), self.path());
        if committish.is_empty() {
            return base;
        }
        match self.kind {
            HostingKind::GitHub => format!("{base}/tree/{committish}"),
            HostingKind::GitLab => format!("{base}/-/tree/{committish}"),
            HostingKind::Bitbucket => format!("{base}/src/{committish}"),
            HostingKind::Gist => format!("{base}/{committish}"),
        }
    }

    /// Web URL of a file in the repository, optionally at a committish.
    ///
    /// An empty committish resolves through `HEAD`.
    pub fn browse_file_url(&self, path: &str, committish: &str) -> String {
        let base = format!("https://{}/{}", self.kind.domain(), self.path());
        let path = path.trim_start_matches('/');
        let rev = if committish.is_empty() {
            "HEAD"
        } else {
            committish
        };
        match self.kind {
            HostingKind::GitHub => format!("{base}/blob/{rev}/{path}"),
            HostingKind::GitLab => format!("{base}/-/blob/{rev}/{path}"),
            HostingKind::Bitbucket => format!("{base}/src/{rev}/{path}"),
            HostingKind::Gist => {
                let anchor = path.replace(['.', '/'], "-").to_lowercase();
                if committish.is_empty() {
                    format!("{base}#file-{anchor}")
                } else {
                    format!("{base}/{committish}#file-{anchor}")
                }
            }
        }
    }
}

/// `kind:path`, e.g. "github:owner/project"
impl std::fmt::Display for HostingDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.path())
    }
}
