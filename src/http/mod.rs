//! HTTP client module with timeout-bounded JSON requests and error classification.

mod client;
mod status;

pub use client::HttpClient;
pub use status::{RateLimit, describe_status, transport_error};
