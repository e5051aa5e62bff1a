// Credentials sign-in through the auth service.

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, HttpResponse};
use gateway_test_support::assert_problem_details;
use serde_json::json;

use crate::common::{response_cookie, SESSION_COOKIE};
use crate::support::tokens::{now_secs, signed_token, unsigned_token};
use crate::support::upstream::{auth_service_issuing, unreachable_url, CallCount, StubServer};
use crate::support::{build_app, test_config};

fn login_request() -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "user@example.com", "password": "hunter2hunter2"}))
}

#[actix_web::test]
async fn test_session_binding_id_comes_from_issued_token() {
    let auth = auth_service_issuing(unsigned_token(json!({"sub": "123", "binding_id": "u1"})));
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = response_cookie(&resp, SESSION_COOKIE).expect("session cookie set");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    // The raw auth-service token never reaches the browser.
    assert!(!cookie.value().starts_with("eyJ"));
    assert!(response_cookie(&resp, "jwt").is_none());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["binding_id"], "u1");
    assert!(body["accessToken"].as_str().unwrap().starts_with("eyJ"));

    auth.stop().await;
}

#[actix_web::test]
async fn test_profile_claims_surface_in_session() {
    let token = unsigned_token(json!({
        "sub": "42",
        "binding_id": "b-42",
        "name": "Ada",
        "email": "ada@example.com",
        "exp": now_secs() + 3600,
    }));
    let auth = auth_service_issuing(token);
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = response_cookie(&resp, SESSION_COOKIE).unwrap();
    let max_age = cookie.max_age().unwrap().whole_seconds();
    assert!(max_age <= 3600 && max_age > 3500, "session capped by token exp, got {max_age}");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("image").is_none());

    auth.stop().await;
}

#[actix_web::test]
async fn test_form_encoded_login_is_accepted() {
    let auth = auth_service_issuing(unsigned_token(json!({"sub": "1", "binding_id": "f1"})));
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("email", "user@example.com"), ("password", "pw")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["binding_id"], "f1");

    auth.stop().await;
}

#[actix_web::test]
async fn test_missing_set_cookie_is_token_not_found() {
    let auth = StubServer::start(|cfg| {
        cfg.route(
            "/auth/login",
            web::post().to(|| async { HttpResponse::Ok().json(json!({"ok": true})) }),
        );
    });
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::BAD_GATEWAY,
        "TOKEN_NOT_FOUND",
        None,
    );

    auth.stop().await;
}

#[actix_web::test]
async fn test_set_cookie_without_jwt_segment_is_token_not_found() {
    let auth = StubServer::start(|cfg| {
        cfg.route(
            "/auth/login",
            web::post().to(|| async {
                HttpResponse::Ok()
                    .append_header(("set-cookie", "jwtx=abc; Path=/"))
                    .finish()
            }),
        );
    });
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(response_cookie(&resp, SESSION_COOKIE).is_none());

    auth.stop().await;
}

#[actix_web::test]
async fn test_rejection_surfaces_service_message() {
    let auth = StubServer::start(|cfg| {
        cfg.route(
            "/auth/login",
            web::post().to(|| async {
                HttpResponse::Unauthorized().json(json!({"message": "Wrong password"}))
            }),
        );
    });
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        Some("Wrong password"),
    );

    auth.stop().await;
}

#[actix_web::test]
async fn test_rejection_without_message_uses_generic_text() {
    let auth = StubServer::start(|cfg| {
        cfg.route(
            "/auth/login",
            web::post().to(|| async { HttpResponse::Forbidden().body("nope") }),
        );
    });
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        Some("Invalid email or password"),
    );

    auth.stop().await;
}

#[actix_web::test]
async fn test_token_missing_binding_id_is_rejected() {
    let auth = auth_service_issuing(unsigned_token(json!({"sub": "123"})));
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    assert!(response_cookie(&resp, SESSION_COOKIE).is_none());
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::UNAUTHORIZED,
        "TOKEN_DECODE_FAILURE",
        None,
    );

    auth.stop().await;
}

#[actix_web::test]
async fn test_signature_is_checked_when_secret_configured() {
    let secret = b"auth-service-shared-secret";
    let claims = json!({"sub": "7", "binding_id": "s7"});

    let forged = auth_service_issuing(signed_token(claims.clone(), b"some-other-secret"));
    let app = build_app(test_config(
        &forged.base_url,
        &unreachable_url(),
        &[("AUTH_TOKEN_SECRET", "auth-service-shared-secret")],
    ))
    .await;
    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    forged.stop().await;

    let genuine = auth_service_issuing(signed_token(claims, secret));
    let app = build_app(test_config(
        &genuine.base_url,
        &unreachable_url(),
        &[("AUTH_TOKEN_SECRET", "auth-service-shared-secret")],
    ))
    .await;
    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    genuine.stop().await;
}

#[actix_web::test]
async fn test_unreachable_auth_service_is_unavailable() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, login_request().to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::SERVICE_UNAVAILABLE,
        "AUTH_SERVICE_UNAVAILABLE",
        Some("Unable to reach the authentication service"),
    );
}

#[actix_web::test]
async fn test_slow_auth_service_times_out_as_unavailable() {
    let auth = StubServer::start(|cfg| {
        cfg.route(
            "/auth/login",
            web::post().to(|| async {
                actix_web::rt::time::sleep(Duration::from_secs(3)).await;
                HttpResponse::Ok().finish()
            }),
        );
    });
    let app = build_app(test_config(
        &auth.base_url,
        &unreachable_url(),
        &[("UPSTREAM_TIMEOUT_MS", "200")],
    ))
    .await;

    let started = std::time::Instant::now();
    let resp = test::call_service(&app, login_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() < Duration::from_secs(2));

    auth.stop().await;
}

#[actix_web::test]
async fn test_blank_fields_are_rejected_without_upstream_call() {
    let calls = CallCount::default();
    let seen = calls.clone();
    let auth = StubServer::start(move |cfg| {
        let seen = seen.clone();
        cfg.route(
            "/auth/login",
            web::post().to(move || {
                seen.hit();
                async { HttpResponse::Ok().finish() }
            }),
        );
    });
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "  ", "password": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::BAD_REQUEST,
        "INVALID_CREDENTIALS_INPUT",
        None,
    );
    assert_eq!(calls.get(), 0);

    auth.stop().await;
}
