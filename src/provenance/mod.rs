//! Release and provenance resolution
//!
//! Answers, for a version of a hosted repository, which commit it was
//! released from, whether the working tree moved past that release, and
//! which committish generated links should pin to.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │     Git     │────▶│   Catalog   │◀────│  Freshness  │
//! │ (ls-remote) │     │ (tags, once)│     │(HEAD vs tag)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ fallback          │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    APIs     │◀────│ ReleaseTag  │     │ Committish  │
//! │  (GitHub)   │     │(lazy commit)│     │ (pin policy)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`]: Per-process facade owning the memoized facts
//! - [`single_flight`]: Run-at-most-once memoization of async producers
//! - [`head`]: HEAD commit resolution
//! - [`catalog`]: Version → tag catalog with git and API strategies
//! - [`tag`]: Release tags with lazily resolved commits
//! - [`listing`]: Parser for `<sha> <ref>` listings
//! - [`freshness`]: Three-valued "is this release older than HEAD"
//! - [`committish`]: Committish overrides and release pinning
//! - [`git`]: Local git transport
//! - [`api`]: Hosting API trait, with implementations in [`apis`]
//! - [`error`]: Error types

pub mod api;
pub mod apis;
pub mod catalog;
pub mod committish;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod git;
pub mod head;
pub mod listing;
pub mod single_flight;
pub mod tag;

pub use catalog::TagCatalog;
pub use committish::CommittishOverrides;
pub use engine::Provenance;
pub use error::{ApiError, GitError, ProvenanceError};
pub use tag::ReleaseTag;
