//! HTTP client for upstream JSON endpoints.

use std::sync::{Arc, RwLock};

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, Result};

use super::status::{RateLimit, describe_status, transport_error};

/// JSON client making exactly one attempt per call.
///
/// Timeouts are configured on the wrapped reqwest `Client`. Rate-limit headers
/// from every response are recorded and shared between clones.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limit: Arc<RwLock<RateLimit>>,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            rate_limit: Arc::new(RwLock::new(RateLimit::default())),
        }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Most recent rate-limit snapshot seen from upstream.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.read().map(|rl| *rl).unwrap_or_default()
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    ///
    /// Connection failures, timeouts and non-2xx statuses yield
    /// `UpstreamUnavailable`; a body that is not the expected JSON yields
    /// `MalformedUpstreamResponse`.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let rate_limit = self.record_rate_limit(response.headers());

        let status = response.status();
        if !status.is_success() {
            let reason = describe_status(status, &rate_limit);
            warn!("GET {} failed: {}", url, reason);
            return Err(FetchError::UpstreamUnavailable(reason));
        }

        let body = response.bytes().await.map_err(transport_error)?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!("GET {} returned an unexpected body: {}", url, e);
            FetchError::MalformedUpstreamResponse(e.to_string())
        })
    }

    fn record_rate_limit(&self, headers: &reqwest::header::HeaderMap) -> RateLimit {
        match self.rate_limit.write() {
            Ok(mut rate_limit) => {
                rate_limit.update_from_headers(headers);
                if rate_limit.is_exhausted() {
                    warn!("Upstream rate limit exhausted");
                }
                *rate_limit
            }
            Err(_) => {
                let mut rate_limit = RateLimit::default();
                rate_limit.update_from_headers(headers);
                rate_limit
            }
        }
    }
}
