//! Session layer: the encrypted session cookie, the session JWT inside it,
//! and projection of the auth-service token into a [`Session`].

pub mod cookies;
pub mod jwt;
pub mod projector;

use std::time::SystemTime;

use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use tracing::debug;

pub use jwt::SessionClaims;
pub use projector::{Projection, Session, SessionProjector};

use crate::auth::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Outcome of looking for a session on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No session cookie was sent
    Absent,
    /// A cookie was sent but does not yield a session
    Invalid,
    Valid(Session),
}

impl SessionLookup {
    pub fn session(self) -> Option<Session> {
        match self {
            SessionLookup::Valid(session) => Some(session),
            _ => None,
        }
    }
}

/// Resolve the session carried by `req`.
///
/// Every step is re-checked: cookie decryption, session JWT signature and
/// expiry, then projection of the embedded auth-service token.
pub fn resolve_session(req: &HttpRequest, state: &AppState) -> SessionLookup {
    let name = &state.config.session_cookie_name;
    let Some(cookie) = req.cookie(name) else {
        return SessionLookup::Absent;
    };

    let Some(opened) = cookies::open(&state.security.cookie_key, cookie) else {
        debug!("session cookie failed to decrypt");
        return SessionLookup::Invalid;
    };

    let claims = match jwt::verify_session_token(opened.value(), &state.security) {
        Ok(claims) => claims,
        Err(_) => {
            debug!("session token rejected");
            return SessionLookup::Invalid;
        }
    };

    match state.projector.refresh(&claims) {
        Ok(projection) => SessionLookup::Valid(projection.session),
        Err(e) => {
            debug!(reason = e.reason(), "embedded token no longer projects");
            SessionLookup::Invalid
        }
    }
}

/// Project a fresh sign-in and build the encrypted cookie that carries it.
pub fn establish(
    identity: &Identity,
    state: &AppState,
) -> Result<(Projection, Cookie<'static>), AppError> {
    let projection = state.projector.project_identity(identity)?;

    let now = SystemTime::now();
    let (token, claims) = jwt::mint_session_token(
        identity,
        projection.claims.exp,
        now,
        state.config.session_max_age_secs,
        &state.security,
    )?;

    let max_age = (claims.exp - claims.iat).max(0);
    let cookie = cookies::session_cookie(
        &state.security.cookie_key,
        &state.config.session_cookie_name,
        token,
        max_age,
        state.config.secure_cookies,
    )
    .ok_or_else(|| AppError::internal("failed to seal session cookie"))?;

    Ok((projection, cookie))
}
