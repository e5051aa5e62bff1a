//! Header allow-lists for both directions of the relay.
//!
//! actix-web and reqwest sit on different `http` crate versions, so values
//! cross over as raw bytes.

use actix_web::http::header::{
    HeaderMap as InboundHeaders, HeaderName as ActixHeaderName, HeaderValue as ActixHeaderValue,
};
use reqwest::header::{HeaderMap as OutboundHeaders, HeaderName, HeaderValue};

/// Request headers relayed to the backend.
pub const REQUEST_HEADER_ALLOW_LIST: [&str; 3] = ["content-type", "cookie", "authorization"];

/// Response headers relayed back to the caller. Framing headers are left to
/// our own HTTP stack.
pub const RESPONSE_HEADER_ALLOW_LIST: [&str; 8] = [
    "content-type",
    "set-cookie",
    "cache-control",
    "etag",
    "expires",
    "last-modified",
    "location",
    "vary",
];

/// Copy every value of each allow-listed header, verbatim and in order.
pub fn forwardable_request_headers(inbound: &InboundHeaders) -> OutboundHeaders {
    let mut out = OutboundHeaders::new();
    for name in REQUEST_HEADER_ALLOW_LIST {
        for value in inbound.get_all(name) {
            if let Ok(value) = HeaderValue::from_bytes(value.as_bytes()) {
                out.append(HeaderName::from_static(name), value);
            }
        }
    }
    out
}

pub fn relayable_response_headers(
    upstream: &OutboundHeaders,
) -> Vec<(ActixHeaderName, ActixHeaderValue)> {
    let mut out = Vec::new();
    for name in RESPONSE_HEADER_ALLOW_LIST {
        for value in upstream.get_all(name) {
            if let Ok(value) = ActixHeaderValue::from_bytes(value.as_bytes()) {
                out.push((ActixHeaderName::from_static(name), value));
            }
        }
    }
    out
}
