//! Exchange of a Google profile for an auth-service token.
//!
//! `POST {auth}/auth/google-login` creates or looks up the account and
//! answers `{token}`. It is called exactly once per sign-in; the caller
//! uses the single result both to gate the sign-in and to emit the
//! sign-in audit event.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::claims::{Identity, ProviderProfile};
use super::error::AuthError;
use super::token::TokenDecoder;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleLoginRequest<'a> {
    email: &'a str,
    name: &'a str,
    image: &'a str,
    google_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleLoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthBridge {
    http: reqwest::Client,
    google_login_url: String,
    decoder: TokenDecoder,
}

impl OAuthBridge {
    pub fn new(http: reqwest::Client, auth_service_base: &str, decoder: TokenDecoder) -> Self {
        Self {
            http,
            google_login_url: format!("{auth_service_base}/auth/google-login"),
            decoder,
        }
    }

    /// Trade a provider profile for a backend-issued identity.
    ///
    /// Non-2xx is `OAuthBridgeFailure`; a 2xx without a token is
    /// `TokenNotFound`. Profile fields fill in claims the token lacks.
    pub async fn exchange(&self, profile: &ProviderProfile) -> Result<Identity, AuthError> {
        let request = GoogleLoginRequest {
            email: profile.email.as_deref().unwrap_or_default(),
            name: profile.name.as_deref().unwrap_or_default(),
            image: profile.picture.as_deref().unwrap_or_default(),
            google_id: &profile.sub,
        };

        let response = self
            .http
            .post(&self.google_login_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "google-login exchange rejected");
            return Err(AuthError::OAuthBridgeFailure {
                status: status.as_u16(),
            });
        }

        let body: GoogleLoginResponse = response
            .json()
            .await
            .map_err(|_| AuthError::TokenNotFound)?;
        let token = body
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::TokenNotFound)?;

        let claims = self.decoder.decode(&token)?;
        let mut identity = Identity::from_claims(token, claims);
        merge_profile(&mut identity, profile);
        Ok(identity)
    }
}

/// Token claims win; the provider profile only fills gaps.
fn merge_profile(identity: &mut Identity, profile: &ProviderProfile) {
    if identity.name.is_none() {
        identity.name = profile.name.clone();
    }
    if identity.email.is_none() {
        identity.email = profile.email.clone();
    }
    if identity.image.is_none() {
        identity.image = profile.picture.clone();
    }
}
