//! Failure taxonomy for the two sign-in paths and token decoding.
//!
//! HTTP-agnostic. Handlers convert into `AppError` at the boundary via
//! `From<AuthError> for AppError`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

/// Why a token could not be turned into claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    /// Not three dot-separated segments
    Malformed,
    /// A segment was not valid base64url
    InvalidEncoding,
    /// Payload was not the expected JSON object
    InvalidPayload,
    /// A required claim was absent or empty
    MissingClaim(&'static str),
    /// `exp` lies in the past
    Expired,
    /// Signature did not verify under the configured secret
    InvalidSignature,
}

impl Display for DecodeReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DecodeReason::Malformed => write!(f, "malformed token"),
            DecodeReason::InvalidEncoding => write!(f, "invalid base64url segment"),
            DecodeReason::InvalidPayload => write!(f, "invalid claims payload"),
            DecodeReason::MissingClaim(name) => write!(f, "missing required claim `{name}`"),
            DecodeReason::Expired => write!(f, "token expired"),
            DecodeReason::InvalidSignature => write!(f, "invalid signature"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Network failure or timeout reaching the auth service.
    #[error("auth service unavailable: {detail}")]
    AuthServiceUnavailable { detail: String },
    /// Auth service answered non-2xx to a credentials login.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },
    /// Auth service answered 2xx but issued no token.
    #[error("token not found in auth service response")]
    TokenNotFound,
    #[error("token decode failure: {reason}")]
    TokenDecodeFailure { reason: DecodeReason },
    /// Backend Google-login exchange answered non-2xx.
    #[error("oauth bridge failure (status {status})")]
    OAuthBridgeFailure { status: u16 },
    /// Callback `state` did not match the one stored at sign-in start.
    #[error("oauth state mismatch")]
    OAuthStateMismatch,
    /// Code exchange or profile fetch against the identity provider failed.
    #[error("identity provider exchange failed: {detail}")]
    ProviderExchangeFailure { detail: String },
}

impl AuthError {
    pub fn decode(reason: DecodeReason) -> Self {
        Self::TokenDecodeFailure { reason }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::AuthServiceUnavailable {
            detail: detail.into(),
        }
    }

    /// Short machine-readable reason used in audit events.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::AuthServiceUnavailable { .. } => "auth_service_unavailable",
            AuthError::InvalidCredentials { .. } => "invalid_credentials",
            AuthError::TokenNotFound => "token_not_found",
            AuthError::TokenDecodeFailure { .. } => "token_decode_failure",
            AuthError::OAuthBridgeFailure { .. } => "oauth_bridge_failure",
            AuthError::OAuthStateMismatch => "oauth_state_mismatch",
            AuthError::ProviderExchangeFailure { .. } => "provider_exchange_failure",
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() { "timeout" } else { "network" };
        AuthError::unavailable(format!("{kind}: {e}"))
    }
}
