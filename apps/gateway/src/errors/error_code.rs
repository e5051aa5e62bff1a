//! Error codes for the gateway's HTTP responses.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in problem-details bodies.

use core::fmt;

/// Centralized error codes for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication
    /// Authentication required
    Unauthorized,
    /// Auth service rejected the credentials
    InvalidCredentials,
    /// Login form was missing email or password
    InvalidCredentialsInput,
    /// Auth service answered 2xx without a `jwt` cookie
    TokenNotFound,
    /// Token could not be decoded into claims
    TokenDecodeFailure,
    /// Auth service could not be reached or timed out
    AuthServiceUnavailable,
    /// Google sign-in is not configured
    OAuthDisabled,

    // Request Validation
    /// General bad request error
    BadRequest,
    /// General not found error
    NotFound,

    // Gateway
    /// Backend could not be reached or timed out
    GatewayUpstreamUnavailable,

    // System Errors
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCredentialsInput => "INVALID_CREDENTIALS_INPUT",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::TokenDecodeFailure => "TOKEN_DECODE_FAILURE",
            Self::AuthServiceUnavailable => "AUTH_SERVICE_UNAVAILABLE",
            Self::OAuthDisabled => "OAUTH_DISABLED",

            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",

            Self::GatewayUpstreamUnavailable => "GATEWAY_UPSTREAM_UNAVAILABLE",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
