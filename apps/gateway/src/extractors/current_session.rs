use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::error::AppError;
use crate::session::{resolve_session, Session};
use crate::state::AppState;

/// The validated session of the current request.
///
/// Uses the session the route guard already resolved when there is one,
/// otherwise resolves it from the cookie. Fails with 401 when absent.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl FromRequest for CurrentSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(session) = req.extensions().get::<Session>() {
            return ready(Ok(CurrentSession(session.clone())));
        }

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::internal("AppState not available")));
        };

        ready(
            resolve_session(req, state)
                .session()
                .map(CurrentSession)
                .ok_or(AppError::Unauthorized),
        )
    }
}
