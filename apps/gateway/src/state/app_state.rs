use std::time::Duration;

use reqwest::redirect::Policy;

use super::security_config::SecurityConfig;
use crate::auth::{CredentialExchange, GoogleClient, OAuthBridge, TokenDecoder};
use crate::config::GatewayConfig;
use crate::error::AppError;
use crate::gateway::BackendGateway;
use crate::session::projector::SessionProjector;

/// Shared, immutable per-process state. Built once, wrapped in `web::Data`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub security: SecurityConfig,
    pub credentials: CredentialExchange,
    pub oauth_bridge: OAuthBridge,
    /// Present only when Google sign-in is configured
    pub google: Option<GoogleClient>,
    pub projector: SessionProjector,
    pub gateway: BackendGateway,
}

impl AppState {
    /// Build every collaborator from the loaded configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self, AppError> {
        let security = SecurityConfig::new(config.session_secret.clone())?;

        let decoder = match &config.auth_token_secret {
            Some(secret) => TokenDecoder::with_verification_secret(secret.clone()),
            None => TokenDecoder::new(),
        };

        let auth_http = outbound_client(config.upstream_timeout)?;
        let backend_http = outbound_client(config.upstream_timeout)?;

        let credentials =
            CredentialExchange::new(auth_http.clone(), &config.auth_service_url, decoder.clone());
        let oauth_bridge =
            OAuthBridge::new(auth_http.clone(), &config.auth_service_url, decoder.clone());
        let google = config.google.clone().map(|google| {
            GoogleClient::new(google, config.google_redirect_uri(), auth_http.clone())
        });
        let gateway = BackendGateway::new(backend_http, &config.backend_url);

        Ok(Self {
            security,
            credentials,
            oauth_bridge,
            google,
            projector: SessionProjector::new(decoder),
            gateway,
            config,
        })
    }
}

/// Client for one upstream: bounded total time, redirects relayed rather
/// than followed.
fn outbound_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))
}
