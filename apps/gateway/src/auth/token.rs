//! Decoding of auth-service tokens into strictly validated claims.
//!
//! The payload is read directly from the compact JWS form so that tokens
//! can be decoded without the signing key. When a verification secret is
//! configured the HS256 signature is checked as well.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::claims::TokenClaims;
use super::error::{AuthError, DecodeReason};

/// Shape accepted off the wire before required-claim checks.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    binding_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenDecoder {
    /// HS256 secret shared with the auth service, if signatures are checked
    verification_secret: Option<Vec<u8>>,
}

impl TokenDecoder {
    /// Decoder that reads claims without checking the signature.
    pub fn new() -> Self {
        Self {
            verification_secret: None,
        }
    }

    /// Decoder that also requires a valid HS256 signature.
    pub fn with_verification_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            verification_secret: Some(secret.into()),
        }
    }

    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode_at(token, SystemTime::now())
    }

    /// Decode against an explicit clock. Pure in `(token, now)`.
    pub fn decode_at(&self, token: &str, now: SystemTime) -> Result<TokenClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::decode(DecodeReason::Malformed));
        };
        if header.is_empty() || payload.is_empty() {
            return Err(AuthError::decode(DecodeReason::Malformed));
        }

        URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| AuthError::decode(DecodeReason::InvalidEncoding))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::decode(DecodeReason::InvalidEncoding))?;

        if let Some(secret) = &self.verification_secret {
            verify_signature(token, secret)?;
        }

        let raw: RawClaims = serde_json::from_slice(&payload)
            .map_err(|_| AuthError::decode(DecodeReason::InvalidPayload))?;

        let claims = validate(raw)?;

        if let Some(exp) = claims.exp {
            let now_secs = now
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            if exp <= now_secs {
                return Err(AuthError::decode(DecodeReason::Expired));
            }
        }

        Ok(claims)
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::decode(DecodeReason::MissingClaim(name))),
    }
}

fn validate(raw: RawClaims) -> Result<TokenClaims, AuthError> {
    Ok(TokenClaims {
        sub: required(raw.sub, "sub")?,
        binding_id: required(raw.binding_id, "binding_id")?,
        name: raw.name,
        email: raw.email,
        image: raw.image,
        iat: raw.iat,
        exp: raw.exp,
    })
}

fn verify_signature(token: &str, secret: &[u8]) -> Result<(), AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp and required claims are checked on our own terms
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<serde_json::Value>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|_| ())
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                AuthError::decode(DecodeReason::InvalidSignature)
            }
            _ => AuthError::decode(DecodeReason::Malformed),
        })
}
