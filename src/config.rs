//! Runtime configuration for the upstream client and the cache.

use std::time::Duration;

use crate::fallback::default_dataset;
use crate::model::RepositorySummary;
use crate::selection::SelectionPolicy;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "repofolio";

/// Entries older than this are stale (but still served on upstream failure).
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How often the scheduler re-warms the cache.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

/// Repositories requested from upstream per fetch.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upstream connection settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new(api_url: Option<String>, token: Option<String>, timeout: Option<Duration>) -> Self {
        let defaults = Self::default();
        Self {
            api_url: api_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout: timeout.unwrap_or(defaults.timeout),
            ..defaults
        }
    }
}

/// Cache behaviour: freshness, fetch size, selection and the static fallback.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub page_size: u32,
    pub selection: SelectionPolicy,
    pub fallback: Vec<RepositorySummary>,
}

impl CacheConfig {
    /// Defaults with the fallback listing pointing at `owner`'s repositories.
    pub fn for_owner(owner: &str) -> Self {
        Self {
            ttl: DEFAULT_TTL,
            page_size: DEFAULT_PAGE_SIZE,
            selection: SelectionPolicy::default(),
            fallback: default_dataset(owner),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_fallback(mut self, fallback: Vec<RepositorySummary>) -> Self {
        self.fallback = fallback;
        self
    }
}
