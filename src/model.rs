//! Repository and profile types: the raw upstream shape and the normalized
//! output shape served to consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for a repository without a description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Placeholder for a repository without a detected language.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Timestamp substituted when upstream sends one that does not parse.
pub const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

const GITHUB_WEB_PREFIX: &str = "https://github.com/";

/// Repository as returned by the upstream listing endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RawRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub owner: Option<RawOwner>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RawOwner {
    pub login: String,
}

impl RawRepository {
    /// Parsed `updated_at`, or `None` when missing or not RFC 3339.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Whether the description carries any non-blank text.
    pub fn has_description(&self) -> bool {
        non_blank(self.description.as_deref()).is_some()
    }

    /// Whether this entry may ever be selected: not a fork and named.
    pub fn is_selectable(&self) -> bool {
        !self.fork && !self.name.trim().is_empty()
    }

    /// Normalize into the output shape.
    ///
    /// `account` is used to rebuild the URL when upstream sends one that is
    /// not of the form `https://github.com/<owner>/<name>` and carries no
    /// owner login.
    pub fn normalize(&self, account: &str) -> RepositorySummary {
        let url = if is_repository_url(&self.html_url) {
            self.html_url.clone()
        } else {
            let owner = self
                .owner
                .as_ref()
                .map(|o| o.login.trim())
                .filter(|login| !login.is_empty())
                .unwrap_or(account);
            format!("{}{}/{}", GITHUB_WEB_PREFIX, owner, self.name)
        };

        let updated_at = match self.updated_at.as_deref() {
            Some(ts) if parse_timestamp(ts).is_some() => ts.to_string(),
            _ => EPOCH_TIMESTAMP.to_string(),
        };

        RepositorySummary {
            id: self.id,
            name: self.name.clone(),
            description: non_blank(self.description.as_deref())
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            url,
            language: non_blank(self.language.as_deref())
                .unwrap_or(UNKNOWN_LANGUAGE)
                .to_string(),
            star_count: self.stargazers_count,
            updated_at,
            topics: self.topics.clone(),
            homepage: non_blank(self.homepage.as_deref()).map(str::to_string),
            is_fork: self.fork,
        }
    }
}

/// Normalized repository served to consumers.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub language: String,
    pub star_count: u64,
    pub updated_at: String,
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip)]
    pub is_fork: bool,
}

/// Public profile of an upstream account.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Checks for `https://github.com/<owner>/<name>` with both segments non-empty.
pub fn is_repository_url(url: &str) -> bool {
    let Some(path) = url.strip_prefix(GITHUB_WEB_PREFIX) else {
        return false;
    };
    let parts: Vec<&str> = path.split('/').collect();
    parts.len() == 2 && parts.iter().all(|p| !p.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
