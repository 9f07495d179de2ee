//! Upstream abstraction for repository hosts.
//!
//! The cache only talks to a [`RepositorySource`], which keeps the HTTP
//! adapter swappable and lets tests script upstream behaviour.

mod github;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Profile, RawRepository};

pub use github::GitHubSource;

/// Trait for upstream repository hosts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Get the API base URL.
    fn api_url(&self) -> &str;

    /// Fetch up to `per_page` repositories owned by `account`, most recently
    /// updated first.
    async fn list_repositories(&self, account: &str, per_page: u32) -> Result<Vec<RawRepository>>;

    /// Fetch the public profile of `account`.
    async fn get_profile(&self, account: &str) -> Result<Profile>;
}
