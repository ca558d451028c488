//! Tag listing parser
//!
//! Parses `<sha> <ref>` lines as printed by `git ls-remote --tags` and
//! `git show-ref --dereference`, or built from the hosting API's tag refs.
//!
//! Format examples:
//! ```text
//! 3f7a1c0e...	refs/tags/v1.2.0        (tag object, or commit for lightweight tags)
//! 9b2d4e81...	refs/tags/v1.2.0^{}     (peeled: commit the annotated tag points to)
//! ```

use indexmap::IndexMap;
use semver::Version;

/// Prefix of tag refs
const TAG_REF_PREFIX: &str = "refs/tags/";

/// Suffix marking a peeled (dereferenced) ref
const PEELED_SUFFIX: &str = "^{}";

/// One `<sha> <ref>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRef {
    pub sha: String,
    /// Ref without the peeled suffix (e.g. "refs/tags/v1.2.0")
    pub raw_ref: String,
    /// Whether the line carried the `^{}` suffix
    pub peeled: bool,
}

impl ListedRef {
    pub fn new(sha: impl Into<String>, reference: &str) -> Self {
        let (raw_ref, peeled) = match reference.strip_suffix(PEELED_SUFFIX) {
            Some(stripped) => (stripped, true),
            None => (reference, false),
        };
        Self {
            sha: sha.into(),
            raw_ref: raw_ref.to_string(),
            peeled,
        }
    }

    /// Tag name if this is a tag ref (e.g. "v1.2.0")
    pub fn tag_name(&self) -> Option<&str> {
        self.raw_ref.strip_prefix(TAG_REF_PREFIX)
    }
}

/// A tag ref with a semantic version, merged from its plain and peeled lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTag {
    /// Tag name (e.g. "v1.2.0")
    pub name: String,
    /// Full ref (e.g. "refs/tags/v1.2.0")
    pub raw_ref: String,
    pub version: Version,
    /// SHA from the plain line
    pub sha: Option<String>,
    /// SHA from the peeled line, present for annotated tags
    pub peeled: Option<String>,
}

/// Parse one `<sha> <ref>` line, separated by tabs or spaces
pub fn parse_ref_line(line: &str) -> Option<ListedRef> {
    let mut parts = line.split_whitespace();
    let sha = parts.next()?;
    let reference = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ListedRef::new(sha, reference))
}

/// Extract the semantic version from a tag name
///
/// Accepts an optional `v` or `=` prefix. Partial versions ("v1", "v1.2")
/// are not versions of a release and yield None.
pub fn tag_version(name: &str) -> Option<Version> {
    let trimmed = name.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    Version::parse(stripped).ok()
}

/// Merge listed refs into version → tag entries
///
/// Refs outside `refs/tags/` and tags without a semantic version are skipped.
/// When two distinct tags normalize to the same version (e.g. "v1.0.0" and
/// "1.0.0"), the first one listed is kept.
pub fn collect_tags(refs: impl IntoIterator<Item = ListedRef>) -> IndexMap<String, ListedTag> {
    let mut tags: IndexMap<String, ListedTag> = IndexMap::new();

    for listed in refs {
        let Some(name) = listed.tag_name() else {
            continue;
        };
        let Some(version) = tag_version(name) else {
            continue;
        };

        let entry = tags
            .entry(version.to_string())
            .or_insert_with(|| ListedTag {
                name: name.to_string(),
                raw_ref: listed.raw_ref.clone(),
                version,
                sha: None,
                peeled: None,
            });

        if entry.raw_ref != listed.raw_ref {
            continue;
        }

        if listed.peeled {
            entry.peeled = Some(listed.sha);
        } else {
            entry.sha = Some(listed.sha);
        }
    }

    tags
}

/// Parse a whole listing output
pub fn parse_listing(output: &str) -> IndexMap<String, ListedTag> {
    collect_tags(output.lines().filter_map(parse_ref_line))
}
