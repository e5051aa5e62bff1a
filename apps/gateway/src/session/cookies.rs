//! Encrypted cookies: the session cookie and the short-lived OAuth
//! state/PKCE cookies.
//!
//! Values are sealed with the private (AES-GCM) cookie jar, so the
//! browser can neither read nor alter them.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::HttpRequest;

pub const OAUTH_STATE_COOKIE: &str = "gateway.oauth-state";
pub const PKCE_VERIFIER_COOKIE: &str = "gateway.pkce-verifier";
/// Scope of the OAuth cookies
pub const AUTH_PATH: &str = "/api/auth";
const OAUTH_COOKIE_TTL_MINUTES: i64 = 5;

/// Encrypt `cookie`'s value under `key`, keeping its attributes.
pub fn seal(key: &Key, cookie: Cookie<'static>) -> Option<Cookie<'static>> {
    let name = cookie.name().to_string();
    let mut jar = CookieJar::new();
    jar.private_mut(key).add(cookie);
    jar.get(&name).cloned()
}

/// Decrypt a cookie sealed with [`seal`]. Tampered or foreign values yield `None`.
pub fn open(key: &Key, cookie: Cookie<'static>) -> Option<Cookie<'static>> {
    let name = cookie.name().to_string();
    let mut jar = CookieJar::new();
    jar.add_original(cookie);
    jar.private(key).get(&name)
}

/// Read and decrypt a named cookie from the request.
pub fn read_sealed(req: &HttpRequest, key: &Key, name: &str) -> Option<String> {
    let cookie = req.cookie(name)?;
    open(key, cookie).map(|c| c.value().to_string())
}

pub fn session_cookie(
    key: &Key,
    name: &str,
    session_token: String,
    max_age_secs: i64,
    secure: bool,
) -> Option<Cookie<'static>> {
    let cookie = Cookie::build(name.to_string(), session_token)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .finish();
    seal(key, cookie)
}

pub fn clear_session_cookie(name: &str) -> Cookie<'static> {
    removal(name.to_string(), "/")
}

/// State and PKCE verifier cookies for an authorization request.
pub fn oauth_cookies(
    key: &Key,
    state: String,
    code_verifier: String,
    secure: bool,
) -> Option<(Cookie<'static>, Cookie<'static>)> {
    let build = |name: &'static str, value: String| {
        Cookie::build(name, value)
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path(AUTH_PATH)
            .max_age(Duration::minutes(OAUTH_COOKIE_TTL_MINUTES))
            .finish()
    };
    let state = seal(key, build(OAUTH_STATE_COOKIE, state))?;
    let verifier = seal(key, build(PKCE_VERIFIER_COOKIE, code_verifier))?;
    Some((state, verifier))
}

pub fn clear_oauth_cookies() -> (Cookie<'static>, Cookie<'static>) {
    (
        removal(OAUTH_STATE_COOKIE.to_string(), AUTH_PATH),
        removal(PKCE_VERIFIER_COOKIE.to_string(), AUTH_PATH),
    )
}

fn removal(name: String, path: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path(path)
        .max_age(Duration::ZERO)
        .finish()
}
