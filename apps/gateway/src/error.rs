use actix_web::error::ResponseError;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::error::AuthError;
use crate::errors::ErrorCode;
use crate::gateway::GatewayError;
use crate::trace_ctx;

/// Header set on locally produced gateway failures so the UI can tell them
/// apart from a 502 relayed from the backend.
pub const GATEWAY_ERROR_HEADER: &str = "x-gateway-error";

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },
    #[error("Token not found in auth service response")]
    TokenNotFound,
    #[error("Token decode failure: {detail}")]
    TokenDecodeFailure { detail: String },
    #[error("Auth service unavailable: {detail}")]
    AuthServiceUnavailable { detail: String },
    #[error("Gateway upstream unavailable: {detail}")]
    GatewayUpstreamUnavailable { detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::InvalidCredentials { .. } => ErrorCode::InvalidCredentials,
            AppError::TokenNotFound => ErrorCode::TokenNotFound,
            AppError::TokenDecodeFailure { .. } => ErrorCode::TokenDecodeFailure,
            AppError::AuthServiceUnavailable { .. } => ErrorCode::AuthServiceUnavailable,
            AppError::GatewayUpstreamUnavailable { .. } => ErrorCode::GatewayUpstreamUnavailable,
            AppError::BadRequest { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// User-facing detail. Upstream and internal specifics stay in logs,
    /// except the auth service's own rejection message.
    fn detail(&self) -> String {
        match self {
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::InvalidCredentials { message } => message.clone(),
            AppError::TokenNotFound => "Sign-in failed: no session token was issued".to_string(),
            AppError::TokenDecodeFailure { .. } => "Sign-in failed: invalid session token".to_string(),
            AppError::AuthServiceUnavailable { .. } => {
                "Unable to reach the authentication service".to_string()
            }
            AppError::GatewayUpstreamUnavailable { .. } => "Service unavailable".to_string(),
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Internal { .. } => "Internal server error".to_string(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            AppError::TokenNotFound => StatusCode::BAD_GATEWAY,
            AppError::TokenDecodeFailure { .. } => StatusCode::UNAUTHORIZED,
            AppError::AuthServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GatewayUpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::AuthServiceUnavailable { detail } => {
                AppError::AuthServiceUnavailable { detail }
            }
            AuthError::InvalidCredentials { message } => AppError::InvalidCredentials { message },
            AuthError::TokenNotFound => AppError::TokenNotFound,
            AuthError::TokenDecodeFailure { reason } => AppError::TokenDecodeFailure {
                detail: reason.to_string(),
            },
            // OAuth detail is never surfaced to the client.
            AuthError::OAuthBridgeFailure { .. }
            | AuthError::OAuthStateMismatch
            | AuthError::ProviderExchangeFailure { .. } => AppError::Unauthorized,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::UpstreamUnavailable { detail } => {
                AppError::GatewayUpstreamUnavailable { detail }
            }
            GatewayError::InvalidUpstreamUrl { detail } => AppError::internal(detail),
            GatewayError::DotSegment { .. } => AppError::bad_request(
                ErrorCode::BadRequest,
                "Path segments `.` and `..` cannot be relayed",
            ),
            GatewayError::UnsupportedMethod { method } => AppError::bad_request(
                ErrorCode::BadRequest,
                format!("Method {method} cannot be relayed"),
            ),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://gateway.local/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));
        if matches!(self, AppError::GatewayUpstreamUnavailable { .. }) {
            builder.insert_header((
                HeaderName::from_static(GATEWAY_ERROR_HEADER),
                HeaderValue::from_static("upstream-unavailable"),
            ));
        }
        builder.json(problem_details)
    }
}
