//! relnotes GitLab - forge access for release note automation
//!
//! This crate provides the typed forge records, the read/write traits the
//! pipeline and publishers program against, and a GitLab REST client.

mod api;
mod client;
pub mod traits;
pub mod types;

pub use client::GitLabClient;
pub use traits::{Forge, ForgePublisher};
pub use types::{Author, Commit, MergeRequest, MergeRequestState, Tag};

/// Result type for forge operations
pub type Result<T> = std::result::Result<T, relnotes_core::ForgeError>;
