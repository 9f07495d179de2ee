//! Choosing which fetched repositories to surface.
//!
//! Upstream has no "pinned repositories" listing on this API path, so the
//! policy approximates curation: flagship names first, then popular or
//! recently active repositories.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::model::{RawRepository, RepositorySummary};

pub const DEFAULT_MAX_RESULTS: usize = 6;
pub const DEFAULT_RECENT_DAYS: i64 = 90;
pub const DEFAULT_MIN_FALLBACK: usize = 3;

/// Names matched case-insensitively as substrings to mark a repository as featured.
pub fn default_featured() -> Vec<String> {
    vec!["pharmup".to_string(), "seculearn".to_string()]
}

/// Tunables of the selection algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPolicy {
    pub featured: Vec<String>,
    pub max_results: usize,
    pub recent_window: Duration,
    pub min_fallback: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            featured: default_featured(),
            max_results: DEFAULT_MAX_RESULTS,
            recent_window: Duration::days(DEFAULT_RECENT_DAYS),
            min_fallback: DEFAULT_MIN_FALLBACK,
        }
    }
}

impl SelectionPolicy {
    pub fn with_featured<I, S>(mut self, featured: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.featured = featured.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the name contains any featured substring, ignoring case.
    pub fn is_featured(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.featured
            .iter()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .any(|f| name.contains(&f))
    }

    fn is_noteworthy(&self, repo: &RawRepository, now: DateTime<Utc>) -> bool {
        repo.stargazers_count > 0
            || repo.has_description()
            || repo
                .updated_at()
                .is_some_and(|updated| now.signed_duration_since(updated) <= self.recent_window)
    }

    /// Select, rank and normalize a raw upstream listing.
    ///
    /// Featured repositories keep upstream order and come first; the rest are
    /// filtered to noteworthy entries and ranked by stars then recency. Forks
    /// never appear. When nothing qualifies, the first `min_fallback`
    /// selectable entries are used, and failing that `fallback` is returned
    /// as is.
    pub fn select(
        &self,
        raw: &[RawRepository],
        account: &str,
        now: DateTime<Utc>,
        fallback: &[RepositorySummary],
    ) -> Vec<RepositorySummary> {
        let (featured, other): (Vec<&RawRepository>, Vec<&RawRepository>) = raw
            .iter()
            .filter(|r| r.is_selectable())
            .partition(|r| self.is_featured(&r.name));

        let mut other: Vec<&RawRepository> = other
            .into_iter()
            .filter(|r| self.is_noteworthy(r, now))
            .collect();
        other.sort_by(|a, b| rank(a, b));

        let mut selected: Vec<&RawRepository> = featured.into_iter().chain(other).collect();
        selected.truncate(self.max_results);

        debug!(
            "Selected {} of {} repositories for {}",
            selected.len(),
            raw.len(),
            account
        );

        if selected.is_empty() {
            selected = raw
                .iter()
                .filter(|r| r.is_selectable())
                .take(self.min_fallback)
                .collect();

            if selected.is_empty() {
                debug!("No selectable repositories for {}, using fallback dataset", account);
                return fallback.to_vec();
            }
            debug!(
                "Nothing qualified for {}, using first {} non-fork repositories",
                account,
                selected.len()
            );
        }

        selected.into_iter().map(|r| r.normalize(account)).collect()
    }
}

/// Stars descending, then most recently updated first. Unparseable dates sort last.
fn rank(a: &RawRepository, b: &RawRepository) -> Ordering {
    b.stargazers_count
        .cmp(&a.stargazers_count)
        .then_with(|| b.updated_at().cmp(&a.updated_at()))
}
