//! Process-wide configuration, read once at startup.
//!
//! `main` calls [`GatewayConfig::from_env`]; everything downstream receives
//! the resulting value through `AppState`. Tests use
//! [`GatewayConfig::from_lookup`] with a map instead of the process env.

pub mod google;
pub mod guard;

use std::time::Duration;

pub use google::GoogleConfig;
pub use guard::GuardConfig;

use crate::error::AppError;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_BIND_PORT: u16 = 3000;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_SESSION_COOKIE_NAME: &str = "gateway.session-token";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct GatewayConfig {
    /// Listen address for the HTTP server
    pub bind_host: String,
    pub bind_port: u16,
    /// Auth service base URL, no trailing slash
    pub auth_service_url: String,
    /// Backend base URL, no trailing slash
    pub backend_url: String,
    /// External origin of this application, no trailing slash
    pub public_url: String,
    pub session_secret: Vec<u8>,
    /// HS256 secret for verifying auth-service token signatures
    pub auth_token_secret: Option<Vec<u8>>,
    pub google: Option<GoogleConfig>,
    pub guard: GuardConfig,
    pub upstream_timeout: Duration,
    pub session_max_age_secs: i64,
    pub session_cookie_name: String,
    pub secure_cookies: bool,
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind_host", &self.bind_host)
            .field("bind_port", &self.bind_port)
            .field("auth_service_url", &self.auth_service_url)
            .field("backend_url", &self.backend_url)
            .field("public_url", &self.public_url)
            .field("session_secret", &"[REDACTED]")
            .field("verifies_token_signature", &self.auth_token_secret.is_some())
            .field("google", &self.google)
            .field("guard", &self.guard)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("session_max_age_secs", &self.session_max_age_secs)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("secure_cookies", &self.secure_cookies)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| AppError::config(format!("{key} must be set")));

        let bind_host = get("GATEWAY_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());
        let bind_port = parse_or("GATEWAY_PORT", get("GATEWAY_PORT"), DEFAULT_BIND_PORT)?;
        if bind_port == 0 {
            return Err(AppError::config("GATEWAY_PORT must be between 1 and 65535"));
        }

        let auth_service_url = base_url("AUTH_SERVICE_URL", &require("AUTH_SERVICE_URL")?)?;
        let backend_url = base_url("BACKEND_URL", &require("BACKEND_URL")?)?;
        let public_url = base_url(
            "PUBLIC_URL",
            &get("PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        )?;

        let session_secret = require("SESSION_SECRET")?.into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(AppError::config(format!(
                "SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes"
            )));
        }

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => {
                let mut google = GoogleConfig::new(id, secret);
                if let Some(url) = get("GOOGLE_AUTH_URL") {
                    google.auth_url = url;
                }
                if let Some(url) = get("GOOGLE_TOKEN_URL") {
                    google.token_url = url;
                }
                if let Some(url) = get("GOOGLE_USERINFO_URL") {
                    google.userinfo_url = url;
                }
                Some(google)
            }
            (None, None) => None,
            _ => {
                return Err(AppError::config(
                    "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set together",
                ))
            }
        };

        let guard = GuardConfig::new(
            get("PROTECTED_PREFIXES")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec![guard::DEFAULT_DASHBOARD_PATH.to_string()]),
            get("LOGIN_PATH").unwrap_or_else(|| guard::DEFAULT_LOGIN_PATH.to_string()),
            get("DASHBOARD_PATH").unwrap_or_else(|| guard::DEFAULT_DASHBOARD_PATH.to_string()),
        )?;

        let upstream_timeout = Duration::from_millis(parse_or(
            "UPSTREAM_TIMEOUT_MS",
            get("UPSTREAM_TIMEOUT_MS"),
            DEFAULT_UPSTREAM_TIMEOUT_MS,
        )?);
        if upstream_timeout.is_zero() {
            return Err(AppError::config("UPSTREAM_TIMEOUT_MS must be positive"));
        }

        let session_max_age_secs = parse_or(
            "SESSION_MAX_AGE_SECS",
            get("SESSION_MAX_AGE_SECS"),
            DEFAULT_SESSION_MAX_AGE_SECS,
        )?;
        if session_max_age_secs <= 0 {
            return Err(AppError::config("SESSION_MAX_AGE_SECS must be positive"));
        }

        let secure_cookies = parse_or(
            "SECURE_COOKIES",
            get("SECURE_COOKIES"),
            public_url.starts_with("https://"),
        )?;

        Ok(Self {
            bind_host,
            bind_port,
            auth_service_url,
            backend_url,
            public_url,
            session_secret,
            auth_token_secret: get("AUTH_TOKEN_SECRET").map(String::into_bytes),
            google,
            guard,
            upstream_timeout,
            session_max_age_secs,
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
            secure_cookies,
            max_body_bytes: parse_or(
                "GATEWAY_MAX_BODY_BYTES",
                get("GATEWAY_MAX_BODY_BYTES"),
                DEFAULT_MAX_BODY_BYTES,
            )?,
        })
    }

    /// Redirect URI registered with Google.
    pub fn google_redirect_uri(&self) -> String {
        format!("{}/api/auth/callback/google", self.public_url)
    }
}

fn base_url(key: &str, raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| AppError::config(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!("{key} must be an http(s) URL")));
    }
    Ok(trimmed.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value"))),
    }
}
