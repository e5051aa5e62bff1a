//! Email/password sign-in against the external auth service.
//!
//! The auth service answers a successful `POST /auth/login` with the token
//! in a `Set-Cookie: jwt=<token>; ...` header. The cookie is parsed here and
//! never forwarded to the browser.

use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::claims::{Credentials, Identity};
use super::error::AuthError;
use super::token::TokenDecoder;

const JWT_COOKIE_NAME: &str = "jwt";
const GENERIC_LOGIN_FAILURE: &str = "Invalid email or password";

/// Error body the auth service sends on non-2xx.
#[derive(Debug, Deserialize)]
struct ServiceMessage {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CredentialExchange {
    http: reqwest::Client,
    login_url: String,
    decoder: TokenDecoder,
}

impl CredentialExchange {
    /// `http` must already carry the outbound timeout.
    pub fn new(http: reqwest::Client, auth_service_base: &str, decoder: TokenDecoder) -> Self {
        Self {
            http,
            login_url: format!("{auth_service_base}/auth/login"),
            decoder,
        }
    }

    /// Validate credentials with the auth service and decode the issued token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = rejection_message(status, response).await;
            return Err(AuthError::InvalidCredentials { message });
        }

        let set_cookie: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_owned)
            .collect();

        let token = extract_jwt_cookie(set_cookie.iter().map(String::as_str))
            .ok_or(AuthError::TokenNotFound)?;

        let claims = self.decoder.decode(&token)?;
        debug!(claims = ?claims.present_claim_names(), "auth service token decoded");

        Ok(Identity::from_claims(token, claims))
    }
}

/// Pull the service's own message out of a rejection, or fall back to a
/// generic one.
async fn rejection_message(status: StatusCode, response: reqwest::Response) -> String {
    let body = response.bytes().await.unwrap_or_default();
    serde_json::from_slice::<ServiceMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            debug!(status = status.as_u16(), "auth service rejection without message");
            GENERIC_LOGIN_FAILURE.to_string()
        })
}

/// Locate a non-empty `jwt=<value>` segment across one or more Set-Cookie
/// header values.
///
/// Values may be separate headers or a single comma-joined header, so every
/// `;`-separated segment is inspected after splitting on commas as well.
pub fn extract_jwt_cookie<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    values
        .into_iter()
        .flat_map(|value| value.split([';', ',']))
        .filter_map(|segment| {
            let (name, value) = segment.trim().split_once('=')?;
            (name.trim() == JWT_COOKIE_NAME).then(|| value.trim().trim_matches('"'))
        })
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}
