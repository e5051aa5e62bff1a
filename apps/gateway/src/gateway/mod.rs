//! Reverse proxy re-exposing the backend under `/api/backend`.

pub mod headers;
pub mod proxy;

use thiserror::Error;

pub use proxy::{BackendGateway, UpstreamResponse};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backend could not be reached (connect error, timeout, broken body)
    #[error("backend unreachable: {detail}")]
    UpstreamUnavailable { detail: String },
    #[error("invalid upstream url: {detail}")]
    InvalidUpstreamUrl { detail: String },
    /// A `.` or `..` segment, literal or percent-encoded
    #[error("path segment `{segment}` would leave the backend base path")]
    DotSegment { segment: String },
    #[error("unsupported method: {method}")]
    UnsupportedMethod { method: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() { "timeout" } else { "network" };
        GatewayError::UpstreamUnavailable {
            detail: format!("{kind}: {e}"),
        }
    }
}
