use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, Either, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{AuthError, Credentials};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::CurrentSession;
use crate::logging::security;
use crate::session::{self, cookies, Projection};
use crate::state::AppState;

/// Query appended to the login page when an OAuth sign-in fails.
pub const OAUTH_SIGNIN_ERROR: &str = "error=OAuthSignin";

/// Credentials sign-in. Accepts JSON or a urlencoded form.
async fn login(
    body: Either<web::Json<Credentials>, web::Form<Credentials>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credentials = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::bad_request(
            ErrorCode::InvalidCredentialsInput,
            "Email and password are required",
        ));
    }

    let identity = match state.credentials.login(&credentials).await {
        Ok(identity) => identity,
        Err(e) => {
            security::login_failed(e.reason(), Some(&credentials.email));
            return Err(e.into());
        }
    };

    let (projection, cookie) = match session::establish(&identity, &state) {
        Ok(established) => established,
        Err(e) => {
            security::login_failed(e.code().as_str(), Some(&credentials.email));
            return Err(e);
        }
    };

    security::login_succeeded(
        projection.session.email.as_deref(),
        &projection.claims.present_claim_names(),
    );

    Ok(HttpResponse::Ok().cookie(cookie).json(projection.session))
}

/// Start the Google authorization-code flow.
async fn google_signin(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let google = state.google.as_ref().ok_or_else(|| {
        AppError::not_found(ErrorCode::OAuthDisabled, "Google sign-in is not configured")
    })?;

    let request = google.authorization_url()?;
    let (state_cookie, verifier_cookie) = cookies::oauth_cookies(
        &state.security.cookie_key,
        request.state,
        request.code_verifier,
        state.config.secure_cookies,
    )
    .ok_or_else(|| AppError::internal("failed to seal OAuth cookies"))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, request.url))
        .cookie(state_cookie)
        .cookie(verifier_cookie)
        .finish())
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Why a callback did not produce a session, and whose sign-in it was.
struct CallbackFailure {
    reason: &'static str,
    email: Option<String>,
}

impl From<AuthError> for CallbackFailure {
    fn from(e: AuthError) -> Self {
        Self {
            reason: e.reason(),
            email: None,
        }
    }
}

async fn complete_google_sign_in(
    req: &HttpRequest,
    query: &CallbackQuery,
    state: &AppState,
) -> Result<(Projection, Cookie<'static>), CallbackFailure> {
    if query.error.is_some() {
        return Err(CallbackFailure {
            reason: "provider_error",
            email: None,
        });
    }
    let google = state.google.as_ref().ok_or(CallbackFailure {
        reason: "oauth_disabled",
        email: None,
    })?;

    let key = &state.security.cookie_key;
    let expected_state = cookies::read_sealed(req, key, cookies::OAUTH_STATE_COOKIE);
    let verifier = cookies::read_sealed(req, key, cookies::PKCE_VERIFIER_COOKIE);

    let (Some(code), Some(returned), Some(expected), Some(verifier)) =
        (&query.code, &query.state, expected_state, verifier)
    else {
        return Err(AuthError::OAuthStateMismatch.into());
    };
    if *returned != expected {
        return Err(AuthError::OAuthStateMismatch.into());
    }

    let profile = google.fetch_profile(code, &verifier).await?;

    // The single bridge call; its result gates the session and feeds the audit event.
    let identity = state
        .oauth_bridge
        .exchange(&profile)
        .await
        .map_err(|e| CallbackFailure {
            reason: e.reason(),
            email: profile.email.clone(),
        })?;

    session::establish(&identity, state).map_err(|e| CallbackFailure {
        reason: e.code().as_str(),
        email: profile.email.clone(),
    })
}

async fn google_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let outcome = complete_google_sign_in(&req, &query, &state).await;
    let (clear_state, clear_verifier) = cookies::clear_oauth_cookies();

    let mut response = HttpResponse::SeeOther();
    response.cookie(clear_state).cookie(clear_verifier);

    match outcome {
        Ok((projection, cookie)) => {
            security::oauth_sign_in(
                Ok(projection.claims.present_claim_names().as_slice()),
                projection.session.email.as_deref(),
            );
            response
                .cookie(cookie)
                .insert_header((header::LOCATION, state.config.guard.dashboard_path.clone()))
                .finish()
        }
        Err(failure) => {
            security::oauth_sign_in(Err(failure.reason), failure.email.as_deref());
            response
                .insert_header((
                    header::LOCATION,
                    format!("{}?{OAUTH_SIGNIN_ERROR}", state.config.guard.login_path),
                ))
                .finish()
        }
    }
}

/// Current session, or `{}` when there is none.
async fn current_session(session: Option<CurrentSession>) -> HttpResponse {
    match session {
        Some(CurrentSession(session)) => HttpResponse::Ok().json(session),
        None => HttpResponse::Ok().json(json!({})),
    }
}

async fn signout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let name = &state.config.session_cookie_name;
    security::sign_out(req.cookie(name).is_some());

    HttpResponse::SeeOther()
        .cookie(cookies::clear_session_cookie(name))
        .insert_header((header::LOCATION, state.config.guard.login_path.clone()))
        .finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)))
        .service(web::resource("/signin/google").route(web::get().to(google_signin)))
        .service(web::resource("/callback/google").route(web::get().to(google_callback)))
        .service(web::resource("/session").route(web::get().to(current_session)))
        .service(web::resource("/signout").route(web::post().to(signout)));
}
