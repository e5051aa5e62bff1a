use actix_web::cookie::Key;
use jsonwebtoken::Algorithm;

use crate::error::AppError;

/// Key material for the application's own session.
#[derive(Clone)]
pub struct SecurityConfig {
    /// Secret for signing and verifying session JWTs
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm (HS256)
    pub algorithm: Algorithm,
    /// Key for encrypting session and OAuth state cookies
    pub cookie_key: Key,
}

impl SecurityConfig {
    /// Derive key material from the session secret (at least 32 bytes).
    pub fn new(session_secret: impl Into<Vec<u8>>) -> Result<Self, AppError> {
        let jwt_secret = session_secret.into();
        if jwt_secret.len() < 32 {
            return Err(AppError::config(
                "session secret must be at least 32 bytes",
            ));
        }
        let cookie_key = Key::derive_from(&jwt_secret);
        Ok(Self {
            jwt_secret,
            algorithm: Algorithm::HS256,
            cookie_key,
        })
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
