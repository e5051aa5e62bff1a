use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::AppError;
use crate::gateway::GatewayError;
use crate::logging::security;
use crate::state::AppState;

pub const BACKEND_PREFIX: &str = "/api/backend";

/// Sub-path after the relay prefix, still percent-encoded.
fn raw_tail(path: &str) -> &str {
    path.strip_prefix(BACKEND_PREFIX)
        .unwrap_or_default()
        .trim_start_matches('/')
}

/// Relay any method under `/api/backend` to the backend.
///
/// Backend statuses, including errors, pass through untouched. Only a
/// backend we could not reach becomes a local error.
async fn relay(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let path = req.uri().path();
    let upstream = state
        .gateway
        .forward(req.method(), raw_tail(path), req.uri().query(), req.headers(), body)
        .await
        .inspect_err(|e| {
            if let GatewayError::UpstreamUnavailable { detail } = e {
                security::gateway_upstream_failed(path, detail);
            }
        })?;

    let status = StatusCode::from_u16(upstream.status)
        .map_err(|_| AppError::internal(format!("backend sent status {}", upstream.status)))?;

    let mut response = HttpResponse::build(status);
    for header in upstream.headers {
        response.append_header(header);
    }
    Ok(response.body(upstream.body))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{tail:.*}").route(web::route().to(relay)));
}
