//! Security audit events.
//!
//! Events carry outcome, reason, claim names and a redacted email. Token,
//! password and cookie values are never passed in.

use tracing::{info, warn};

use crate::logging::pii::Redacted;
use crate::trace_ctx;

fn masked(email: Option<&str>) -> String {
    email.map(|e| Redacted(e).to_string()).unwrap_or_default()
}

pub fn login_succeeded(email: Option<&str>, claims: &[&str]) {
    let trace_id = trace_ctx::trace_id();

    info!(
        event = "SECURITY_LOGIN_SUCCEEDED",
        %trace_id,
        method = "credentials",
        email = %masked(email),
        claims = ?claims,
        "Credentials sign-in succeeded"
    );
}

pub fn login_failed(reason: &str, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        method = "credentials",
        email = %masked(email),
        reason,
        "Authentication failure"
    );
}

/// Outcome of a Google sign-in, logged once per callback.
pub fn oauth_sign_in(outcome: Result<&[&str], &str>, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    match outcome {
        Ok(claims) => info!(
            event = "SECURITY_OAUTH_SIGN_IN",
            %trace_id,
            provider = "google",
            outcome = "success",
            email = %masked(email),
            claims = ?claims,
            "OAuth sign-in succeeded"
        ),
        Err(reason) => warn!(
            event = "SECURITY_OAUTH_SIGN_IN",
            %trace_id,
            provider = "google",
            outcome = "failure",
            email = %masked(email),
            reason,
            "OAuth sign-in failed"
        ),
    }
}

pub fn sign_out(had_session: bool) {
    let trace_id = trace_ctx::trace_id();

    info!(
        event = "SECURITY_SIGN_OUT",
        %trace_id,
        had_session,
        "Session cleared"
    );
}

pub fn gateway_upstream_failed(path: &str, reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_GATEWAY_UPSTREAM_FAILED",
        %trace_id,
        path,
        reason = %Redacted(reason),
        "Backend unreachable"
    );
}
