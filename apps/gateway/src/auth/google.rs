//! Google authorization-code flow with PKCE.
//!
//! Produces a [`ProviderProfile`] that [`super::oauth_bridge::OAuthBridge`]
//! trades for an auth-service token.

use serde::Deserialize;
use url::Url;

use super::claims::ProviderProfile;
use super::error::AuthError;
use super::pkce;
use crate::config::GoogleConfig;

/// Authorization redirect plus the PKCE values to keep until the callback.
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GoogleClient {
    config: GoogleConfig,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig, redirect_uri: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            config,
            redirect_uri: redirect_uri.into(),
            http,
        }
    }

    pub fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError> {
        let state = pkce::generate_state();
        let code_verifier = pkce::generate_code_verifier();
        let code_challenge = pkce::generate_code_challenge(&code_verifier);

        let mut url = Url::parse(&self.config.auth_url).map_err(|e| {
            AuthError::ProviderExchangeFailure {
                detail: format!("invalid authorization url: {e}"),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", "openid email profile")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
            code_verifier,
        })
    }

    /// Exchange the callback code and fetch the signed-in user's profile.
    pub async fn fetch_profile(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<ProviderProfile, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(provider_error("token exchange"))?;
        let response = ensure_success(response, "token exchange")?;
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(provider_error("token exchange"))?;

        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(provider_error("userinfo"))?;
        let response = ensure_success(response, "userinfo")?;
        response
            .json::<ProviderProfile>()
            .await
            .map_err(provider_error("userinfo"))
    }
}

fn provider_error(operation: &'static str) -> impl Fn(reqwest::Error) -> AuthError {
    move |e| AuthError::ProviderExchangeFailure {
        detail: format!("{operation}: {e}"),
    }
}

fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, AuthError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(AuthError::ProviderExchangeFailure {
        detail: format!("{operation} returned {}", response.status().as_u16()),
    })
}
