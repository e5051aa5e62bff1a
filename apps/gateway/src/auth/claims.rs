//! Claims carried by auth-service tokens and the identity record built from them.

use serde::{Deserialize, Serialize};

/// Claims decoded from a token issued by the auth service.
///
/// `sub` and `binding_id` are required; the decoder rejects tokens where
/// either is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub binding_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Issued-at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiry (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Names of the claims present, for audit logging.
    pub fn present_claim_names(&self) -> Vec<&'static str> {
        let mut names = vec!["sub", "binding_id"];
        if self.name.is_some() {
            names.push("name");
        }
        if self.email.is_some() {
            names.push("email");
        }
        if self.image.is_some() {
            names.push("image");
        }
        if self.iat.is_some() {
            names.push("iat");
        }
        if self.exp.is_some() {
            names.push("exp");
        }
        names
    }
}

/// Email/password pair for a credentials login. Never persisted.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &crate::logging::pii::Redacted(&self.email))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identity produced by a successful sign-in, on either path.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// `sub` claim of the token
    pub id: String,
    /// Raw auth-service token
    pub token: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub binding_id: String,
}

impl Identity {
    /// Build an identity from a token and its already-decoded claims.
    pub fn from_claims(token: impl Into<String>, claims: TokenClaims) -> Self {
        Self {
            id: claims.sub,
            token: token.into(),
            name: claims.name,
            email: claims.email,
            image: claims.image,
            binding_id: claims.binding_id,
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .field("binding_id", &self.binding_id)
            .finish_non_exhaustive()
    }
}

/// Profile returned by the identity provider (Google userinfo).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    /// Provider-side account id
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "image")]
    pub picture: Option<String>,
}
