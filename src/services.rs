//! Service factory for building the cache and its upstream client.
//!
//! Construction of dependencies (HTTP client, GitHub source, cache) is kept
//! apart from the configuration values they are built from.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::{
    cache::RepositoryCache,
    config::{CacheConfig, Config},
    http::HttpClient,
    source::GitHubSource,
};

/// Build an HTTP client with the configured user agent, timeout and optional token.
pub fn build_http_client(config: &Config) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );

    if let Some(token) = config.token.as_deref() {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GITHUB_TOKEN contains characters not allowed in a header")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("Using token for authentication: {}", mask_token(token));
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(HttpClient::new(client))
}

/// Build a GitHub source from configuration
pub fn build_source(config: &Config) -> Result<GitHubSource> {
    let http_client = build_http_client(config)?;
    Ok(GitHubSource::from_http_client(http_client, &config.api_url))
}

/// Build a repository cache backed by GitHub.
pub fn build_cache(config: &Config, cache_config: CacheConfig) -> Result<RepositoryCache<GitHubSource>> {
    Ok(RepositoryCache::new(build_source(config)?, cache_config))
}

/// Show only the ends of a token, e.g. `ghp_*********wxyz`.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn config_with_token(token: Option<&str>) -> Config {
        Config::new(None, token.map(str::to_string), None)
    }

    #[tokio::test]
    async fn test_build_http_client_with_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_header(
                "Authorization",
                Matcher::Exact("Bearer test_token".to_string()),
            )
            .match_header("User-Agent", "repofolio")
            .create();

        let http_client = build_http_client(&config_with_token(Some("test_token"))).unwrap();
        let _ = http_client.inner().get(server.url()).send().await;

        mock.assert();
    }

    #[tokio::test]
    async fn test_build_http_client_without_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_header("Authorization", Matcher::Missing)
            .match_header("User-Agent", "repofolio")
            .create();

        let http_client = build_http_client(&config_with_token(None)).unwrap();
        let _ = http_client.inner().get(server.url()).send().await;

        mock.assert();
    }

    #[test]
    fn test_build_http_client_rejects_invalid_token() {
        let result = build_http_client(&config_with_token(Some("bad\ntoken")));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_build_cache_uses_api_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/alice")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"login": "alice"}"#)
            .create_async()
            .await;

        let config = Config::new(Some(server.url()), None, Some(Duration::from_secs(5)));
        let cache = build_cache(&config, CacheConfig::for_owner("alice")).unwrap();
        let profile = cache.fetch_profile("alice").await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.login, "alice");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ghp_abcdefghijwxyz"), "ghp_*********wxyz");
        assert_eq!(mask_token("short"), "*********");
    }
}
