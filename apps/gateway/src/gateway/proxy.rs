use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::http::Method;
use bytes::Bytes;
use tracing::debug;

use super::headers::{forwardable_request_headers, relayable_response_headers};
use super::GatewayError;

/// Backend response as relayed to the caller.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct BackendGateway {
    http: reqwest::Client,
    base_url: String,
}

impl BackendGateway {
    pub fn new(http: reqwest::Client, backend_base: &str) -> Self {
        Self {
            http,
            base_url: backend_base.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/{tail}` plus `?{query}` when one was sent. `tail` is used as
    /// received, percent-encoding intact.
    ///
    /// URL parsing resolves `..` and `%2e%2e` segments, so any dot segment
    /// is refused rather than letting the request climb above the base path.
    pub fn upstream_url(&self, tail: &str, query: Option<&str>) -> Result<reqwest::Url, GatewayError> {
        if let Some(segment) = tail.split(['/', '\\']).find(|s| is_dot_segment(s)) {
            return Err(GatewayError::DotSegment {
                segment: segment.to_string(),
            });
        }

        let mut url = format!("{}/{}", self.base_url, tail.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        reqwest::Url::parse(&url).map_err(|e| GatewayError::InvalidUpstreamUrl {
            detail: format!("{e}"),
        })
    }

    /// Re-issue the inbound request against the backend.
    ///
    /// Any status the backend answers with is a success here; only failing
    /// to get an answer at all is an error.
    pub async fn forward(
        &self,
        method: &Method,
        tail: &str,
        query: Option<&str>,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, GatewayError> {
        let url = self.upstream_url(tail, query)?;
        let method = reqwest::Method::from_bytes(method.as_str().as_bytes()).map_err(|_| {
            GatewayError::UnsupportedMethod {
                method: method.to_string(),
            }
        })?;
        let sends_body = method != reqwest::Method::GET && method != reqwest::Method::HEAD;

        debug!(method = %method, path = url.path(), "forwarding to backend");

        let mut request = self
            .http
            .request(method, url)
            .headers(forwardable_request_headers(inbound_headers));
        if sends_body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = relayable_response_headers(response.headers());
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// `.` or `..`, with either dot possibly written as `%2e`.
fn is_dot_segment(segment: &str) -> bool {
    let lowered = segment.to_ascii_lowercase();
    matches!(
        lowered.as_str(),
        "." | "%2e" | ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}
