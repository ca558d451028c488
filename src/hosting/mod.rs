//! Hosted repository descriptors
//!
//! A [`HostingDescriptor`] identifies a repository on a hosting provider and
//! knows how to build the URLs the provenance engine and the template
//! filters need. Descriptors are produced from repository URLs found in
//! package metadata by [`RepositoryUrlParser`].

pub mod types;
pub mod url;

pub use types::{HostingDescriptor, HostingKind};
pub use url::{HostingParseError, RepositoryUrlParser};
