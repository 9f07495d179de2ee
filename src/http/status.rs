//! Classification of failed upstream requests and rate-limit bookkeeping.

use chrono::DateTime;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::error::FetchError;

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Unix timestamp at which the window resets.
    pub reset: Option<u64>,
}

impl RateLimit {
    /// Read `x-ratelimit-*` headers; absent headers leave the previous value.
    pub fn update_from_headers(&mut self, headers: &HeaderMap) {
        if let Some(limit) = header_u64(headers, "x-ratelimit-limit") {
            self.limit = Some(limit);
        }
        if let Some(remaining) = header_u64(headers, "x-ratelimit-remaining") {
            self.remaining = Some(remaining);
        }
        if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
            self.reset = Some(reset);
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    fn reset_at(&self) -> String {
        self.reset
            .and_then(|reset| DateTime::from_timestamp(reset as i64, 0))
            .map(|dt| dt.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Describe a non-2xx status in terms a caller can act on.
pub fn describe_status(status: StatusCode, rate_limit: &RateLimit) -> String {
    match status {
        StatusCode::UNAUTHORIZED => {
            "authentication failed (HTTP 401), check GITHUB_TOKEN".to_string()
        }
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit.is_exhausted() => {
            format!(
                "rate limit exceeded (HTTP {}), resets at {}",
                status.as_u16(),
                rate_limit.reset_at()
            )
        }
        StatusCode::FORBIDDEN => "access forbidden (HTTP 403)".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "too many requests (HTTP 429)".to_string(),
        StatusCode::NOT_FOUND => "not found (HTTP 404)".to_string(),
        s if s.is_client_error() => format!("client error (HTTP {})", s.as_u16()),
        s if s.is_server_error() => format!("server error (HTTP {})", s.as_u16()),
        s => format!("unexpected status (HTTP {})", s.as_u16()),
    }
}

/// Map a transport-level failure (connect, timeout, body read) to `UpstreamUnavailable`.
pub fn transport_error(error: reqwest::Error) -> FetchError {
    let reason = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("request failed: {}", error)
    };
    FetchError::UpstreamUnavailable(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_rate_limit_from_headers() {
        let mut rate_limit = RateLimit::default();
        rate_limit.update_from_headers(&headers(&[
            ("x-ratelimit-limit", "60"),
            ("x-ratelimit-remaining", "59"),
            ("x-ratelimit-reset", "1700000000"),
        ]));

        assert_eq!(rate_limit.limit, Some(60));
        assert_eq!(rate_limit.remaining, Some(59));
        assert_eq!(rate_limit.reset, Some(1_700_000_000));
        assert!(!rate_limit.is_exhausted());
    }

    #[test]
    fn test_rate_limit_keeps_previous_values() {
        let mut rate_limit = RateLimit {
            limit: Some(5000),
            remaining: Some(10),
            reset: None,
        };
        rate_limit.update_from_headers(&headers(&[("x-ratelimit-remaining", "garbage")]));
        assert_eq!(rate_limit.limit, Some(5000));
        assert_eq!(rate_limit.remaining, Some(10));
    }

    #[test]
    fn test_describe_rate_limited() {
        let rate_limit = RateLimit {
            limit: Some(60),
            remaining: Some(0),
            reset: Some(0),
        };
        let msg = describe_status(StatusCode::FORBIDDEN, &rate_limit);
        assert!(msg.contains("rate limit exceeded"));
        assert!(msg.contains("00:00:00 UTC"));

        let msg = describe_status(StatusCode::TOO_MANY_REQUESTS, &rate_limit);
        assert!(msg.contains("rate limit exceeded"));
    }

    #[test]
    fn test_describe_forbidden_without_exhaustion() {
        let msg = describe_status(StatusCode::FORBIDDEN, &RateLimit::default());
        assert_eq!(msg, "access forbidden (HTTP 403)");
    }

    #[test]
    fn test_describe_other_statuses() {
        let rl = RateLimit::default();
        assert!(describe_status(StatusCode::UNAUTHORIZED, &rl).contains("GITHUB_TOKEN"));
        assert_eq!(describe_status(StatusCode::NOT_FOUND, &rl), "not found (HTTP 404)");
        assert_eq!(
            describe_status(StatusCode::UNPROCESSABLE_ENTITY, &rl),
            "client error (HTTP 422)"
        );
        assert_eq!(
            describe_status(StatusCode::BAD_GATEWAY, &rl),
            "server error (HTTP 502)"
        );
        assert_eq!(
            describe_status(StatusCode::MOVED_PERMANENTLY, &rl),
            "unexpected status (HTTP 301)"
        );
    }
}
