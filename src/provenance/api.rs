//! Hosting API trait for listing tags and dereferencing tag objects

#[cfg(test)]
use mockall::automock;

use crate::hosting::HostingDescriptor;
use crate::provenance::error::ProvenanceError;

/// A tag ref as reported by a hosting API
///
/// The SHA is taken as a tag object. For a lightweight tag it is the commit
/// itself, which [`TagApi::tag_commit`] cannot dereference: such tags only
/// resolve through the local transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Full ref (e.g. "refs/tags/v1.2.0")
    pub raw_ref: String,
    /// SHA of the object the ref points to (a tag object for annotated tags)
    pub sha: String,
}

/// Trait for the REST fallback of a hosting provider
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagApi: Send + Sync {
    /// Lists the tag refs of a repository
    ///
    /// # Returns
    /// * `Ok(Vec<TagRef>)` - All tag refs, in the order the API reports them
    /// * `Err(ProvenanceError::Unsupported)` - The provider has no implementation
    /// * `Err(ProvenanceError::Api)` - Request failed or the response was malformed
    async fn list_tag_refs(
        &self,
        repository: &HostingDescriptor,
    ) -> Result<Vec<TagRef>, ProvenanceError>;

    /// Reads a tag object and returns the SHA of the commit it points to
    async fn tag_commit(
        &self,
        repository: &HostingDescriptor,
        tag_sha: &str,
    ) -> Result<String, ProvenanceError>;
}
