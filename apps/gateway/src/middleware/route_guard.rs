//! Route-level access control.
//!
//! Runs before every page and API handler. The session is resolved from
//! the cookie on each request; a malformed or expired session counts as
//! no session. A resolved session is stored in request extensions for
//! `CurrentSession`, and the decision for `StructuredLogger`.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::config::GuardConfig;
use crate::session::{cookies, resolve_session, SessionLookup};
use crate::state::AppState;

/// Result of evaluating the guard for one request. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

impl GuardDecision {
    /// Short form for request logs.
    pub fn label(&self) -> &'static str {
        match self {
            GuardDecision::Pass => "pass",
            GuardDecision::Redirect(_) => "redirect",
        }
    }
}

/// Pure guard transition over (path, session present).
///
/// `path` is the decoded path the router matches against.
pub fn decide(guard: &GuardConfig, path: &str, has_session: bool) -> GuardDecision {
    if !has_session && guard.is_protected(path) {
        GuardDecision::Redirect(guard.login_path.clone())
    } else if has_session && guard.is_login_page(path) {
        GuardDecision::Redirect(guard.dashboard_path.clone())
    } else {
        GuardDecision::Pass
    }
}

pub struct RouteGuard;

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware { service }))
    }
}

pub struct RouteGuardMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            return Box::pin(async {
                Err(actix_web::error::ErrorInternalServerError(
                    "AppState not available",
                ))
            });
        };

        let lookup = resolve_session(req.request(), &state);
        let invalid_cookie = lookup == SessionLookup::Invalid;

        let session = lookup.session();
        // The router matches the requoted path (`%62` is `b`), so the guard
        // must judge that form, not the raw URI.
        let path = req.match_info().as_str().to_string();
        let decision = decide(&state.config.guard, &path, session.is_some());
        req.extensions_mut().insert(decision.clone());

        match decision {
            GuardDecision::Pass => {
                if let Some(session) = session {
                    req.extensions_mut().insert(session);
                }
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            GuardDecision::Redirect(location) => {
                debug!(path = %path, location = %location, "route guard redirect");

                let mut response = HttpResponse::TemporaryRedirect();
                response.insert_header((header::LOCATION, location));
                if invalid_cookie {
                    response.cookie(cookies::clear_session_cookie(
                        &state.config.session_cookie_name,
                    ));
                }
                let res = req.into_response(response.finish()).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
