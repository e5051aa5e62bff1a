use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Claims of the application's own session token.
///
/// Carries the auth-service token so the session can be re-projected on
/// every request, plus profile fields for claims that token lacks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Identity id (`sub` of the auth-service token)
    pub sub: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint an HS256 session token for `identity`.
///
/// The session never outlives the auth-service token: `exp` is the earlier
/// of `now + max_age_secs` and `token_exp`.
pub fn mint_session_token(
    identity: &Identity,
    token_exp: Option<i64>,
    now: SystemTime,
    max_age_secs: i64,
    security: &SecurityConfig,
) -> Result<(String, SessionClaims), AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;

    let mut exp = iat + max_age_secs;
    if let Some(token_exp) = token_exp {
        exp = exp.min(token_exp);
    }

    let claims = SessionClaims {
        sub: identity.id.clone(),
        access_token: identity.token.clone(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        image: identity.image.clone(),
        iat,
        exp,
    };

    let token = encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode session JWT: {e}")))?;

    Ok((token, claims))
}

/// Verify a session token and return its claims. Expiry is enforced.
pub fn verify_session_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<SessionClaims, AppError> {
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = 0;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}
