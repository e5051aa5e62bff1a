//! Maps an auth-service token onto the session object the rest of the
//! application sees.
//!
//! Runs at sign-in and again on every request carrying a session, so the
//! surfaced `binding_id` is always the one in the token currently held.

use serde::{Deserialize, Serialize};

use super::jwt::SessionClaims;
use crate::auth::{AuthError, Identity, TokenClaims, TokenDecoder};

/// Session exposed beyond the auth core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Correlation key for every backend call made for this user
    pub binding_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A freshly projected session and the claims it was built from.
#[derive(Debug, Clone)]
pub struct Projection {
    pub session: Session,
    pub claims: TokenClaims,
}

#[derive(Debug, Clone, Default)]
pub struct SessionProjector {
    decoder: TokenDecoder,
}

impl SessionProjector {
    pub fn new(decoder: TokenDecoder) -> Self {
        Self { decoder }
    }

    /// Project a just-signed-in identity.
    pub fn project_identity(&self, identity: &Identity) -> Result<Projection, AuthError> {
        self.project(
            &identity.token,
            identity.name.as_deref(),
            identity.email.as_deref(),
            identity.image.as_deref(),
        )
    }

    /// Re-project the token carried by an existing session.
    pub fn refresh(&self, claims: &SessionClaims) -> Result<Projection, AuthError> {
        self.project(
            &claims.access_token,
            claims.name.as_deref(),
            claims.email.as_deref(),
            claims.image.as_deref(),
        )
    }

    /// Decode first; nothing is populated unless decoding succeeds.
    fn project(
        &self,
        token: &str,
        name: Option<&str>,
        email: Option<&str>,
        image: Option<&str>,
    ) -> Result<Projection, AuthError> {
        let claims = self.decoder.decode(token)?;

        let session = Session {
            access_token: token.to_string(),
            binding_id: claims.binding_id.clone(),
            name: claims.name.clone().or_else(|| name.map(str::to_owned)),
            email: claims.email.clone().or_else(|| email.map(str::to_owned)),
            image: claims.image.clone().or_else(|| image.map(str::to_owned)),
        };

        Ok(Projection { session, claims })
    }
}
