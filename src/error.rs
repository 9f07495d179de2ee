//! Error taxonomy for upstream fetches.

use thiserror::Error;

/// Failure talking to the upstream repository host.
///
/// Network failures, timeouts and non-2xx statuses are all reported as
/// [`FetchError::UpstreamUnavailable`]; a body that cannot be decoded into
/// the expected shape is [`FetchError::MalformedUpstreamResponse`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}

impl FetchError {
    /// Collapse any failure into `UpstreamUnavailable`, keeping its message.
    ///
    /// Callers that have nothing to fall back to only report unavailability.
    pub fn into_unavailable(self) -> Self {
        match self {
            FetchError::UpstreamUnavailable(msg) => FetchError::UpstreamUnavailable(msg),
            FetchError::MalformedUpstreamResponse(msg) => {
                FetchError::UpstreamUnavailable(format!("malformed response: {}", msg))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
