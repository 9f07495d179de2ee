//! GitHub source implementation.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::config::DEFAULT_API_URL;
use crate::error::Result;
use crate::http::{HttpClient, RateLimit};
use crate::model::{Profile, RawRepository};

use super::RepositorySource;

/// GitHub REST API source.
pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubSource {
    /// Create a new GitHub source with default API URL.
    pub fn new(client: Client) -> Self {
        Self::with_api_url(client, DEFAULT_API_URL)
    }

    /// Create a new GitHub source with custom API URL.
    pub fn with_api_url(client: Client, api_url: &str) -> Self {
        Self::from_http_client(HttpClient::new(client), api_url)
    }

    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Latest rate-limit figures reported by GitHub.
    pub fn rate_limit(&self) -> RateLimit {
        self.http_client.rate_limit()
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    async fn list_repositories(&self, account: &str, per_page: u32) -> Result<Vec<RawRepository>> {
        let url = format!("{}/users/{}/repos", self.api_url, account);
        debug!("Fetching repositories from {}...", url);

        let per_page = per_page.to_string();
        self.http_client
            .get_json_with_query(
                &url,
                &[
                    ("sort", "updated"),
                    ("direction", "desc"),
                    ("per_page", &per_page),
                ],
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_profile(&self, account: &str) -> Result<Profile> {
        let url = format!("{}/users/{}", self.api_url, account);
        debug!("Fetching profile from {}...", url);
        self.http_client.get_json(&url).await
    }
}
