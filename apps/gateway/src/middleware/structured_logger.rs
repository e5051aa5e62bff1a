//! One `request_completed` event per request.
//!
//! Besides method, path, status and duration the event says what the
//! gateway itself decided: the route guard's decision and, for
//! `/api/backend` requests, whether the backend answered.

use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{error, info, warn};

use super::route_guard::GuardDecision;
use crate::error::GATEWAY_ERROR_HEADER;
use crate::routes::backend::BACKEND_PREFIX;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// What the gateway did with a request, as reported in the log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: StatusCode,
    /// `pass`, `redirect`, or `none` when the guard never ran
    pub guard: &'static str,
    /// Set only for relay requests
    pub relay: Option<&'static str>,
}

impl RequestOutcome {
    pub fn from_response<B>(path: &str, res: &ServiceResponse<B>) -> Self {
        let guard = res
            .request()
            .extensions()
            .get::<GuardDecision>()
            .map_or("none", GuardDecision::label);
        let relay = is_relay_path(path).then(|| {
            if res.headers().contains_key(GATEWAY_ERROR_HEADER) {
                "upstream_unavailable"
            } else if res.status().is_client_error() && res.response().error().is_some() {
                "refused"
            } else {
                "relayed"
            }
        });
        Self {
            status: res.status(),
            guard,
            relay,
        }
    }

    fn from_error(path: &str, err: &ActixError) -> Self {
        Self {
            status: err.as_response_error().status_code(),
            guard: "none",
            relay: is_relay_path(path).then_some("refused"),
        }
    }
}

fn is_relay_path(path: &str) -> bool {
    path.strip_prefix(BACKEND_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        // Path only: query strings may carry OAuth codes.
        let path = req.path().to_string();
        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let outcome = match &result {
                Ok(res) => RequestOutcome::from_response(&path, res),
                Err(err) => RequestOutcome::from_error(&path, err),
            };
            let duration_us = start.elapsed().as_micros() as u64;
            let status_code = outcome.status.as_u16();
            let relay = outcome.relay.unwrap_or("-");

            macro_rules! completed {
                ($level:ident) => {
                    $level!(
                        http.method = %method,
                        url.path = %path,
                        http.status_code = status_code,
                        guard = outcome.guard,
                        relay,
                        duration_us,
                        trace_id = %trace_id,
                        message = "request_completed"
                    )
                };
            }

            if outcome.status.is_server_error() {
                completed!(error);
            } else if outcome.status.is_client_error() {
                completed!(warn);
            } else {
                completed!(info);
            }

            result
        })
    }
}
