// Route guard behaviour end to end.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, HttpMessage};
use gateway::middleware::GuardDecision;
use serde_json::json;

use crate::common::{location, removes_cookie, response_cookie, SESSION_COOKIE};
use crate::support::tokens::unsigned_token;
use crate::support::upstream::{auth_service_issuing, unreachable_url};
use crate::support::{build_app, test_config};

fn get(uri: &str, cookie: Option<&Cookie<'static>>) -> actix_http::Request {
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    req.to_request()
}

#[actix_web::test]
async fn test_unauthenticated_protected_request_redirects_to_login() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;

    for path in ["/dashboard", "/dashboard/", "/dashboard/campaigns/7"] {
        let resp = test::call_service(&app, get(path, None)).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/login"), "{path}");
        assert!(resp.headers().contains_key("x-request-id"));
        assert!(resp.headers().contains_key("x-frame-options"));
    }
}

#[actix_web::test]
async fn test_signed_in_user_is_moved_off_login_and_into_dashboard() {
    let auth = auth_service_issuing(unsigned_token(json!({"sub": "1", "binding_id": "b1", "name": "Lin"})));
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "lin@example.com", "password": "pw"}))
        .to_request();
    let cookie = response_cookie(&test::call_service(&app, login).await, SESSION_COOKIE).unwrap();

    let resp = test::call_service(&app, get("/login", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    let resp = test::call_service(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"Dashboard (Lin)");

    auth.stop().await;
}

#[actix_web::test]
async fn test_invalid_cookie_counts_as_no_session_and_is_removed() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;
    let junk = Cookie::new(SESSION_COOKIE, "not-a-sealed-value");

    let resp = test::call_service(&app, get("/dashboard", Some(&junk))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/login"));
    assert!(removes_cookie(&resp, SESSION_COOKIE));

    // The login page itself is served; the guard only clears on redirect.
    let resp = test::call_service(&app, get("/login", Some(&junk))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(response_cookie(&resp, SESSION_COOKIE).is_none());
}

#[actix_web::test]
async fn test_public_paths_pass_through() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, get("/health", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&test::read_body(resp).await[..], b"ok");

    let resp = test::call_service(&app, get("/login", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Prefix matching is per segment.
    let resp = test::call_service(&app, get("/dashboards", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_configured_prefixes_and_paths_are_honoured() {
    let app = build_app(test_config(
        &unreachable_url(),
        &unreachable_url(),
        &[
            ("PROTECTED_PREFIXES", "/app, /settings"),
            ("LOGIN_PATH", "/sign-in"),
            ("DASHBOARD_PATH", "/app/home"),
        ],
    ))
    .await;

    let resp = test::call_service(&app, get("/settings/profile", None)).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/sign-in"));

    let resp = test::call_service(&app, get("/sign-in", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // No longer protected under this configuration.
    let resp = test::call_service(&app, get("/dashboard", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_percent_encoded_paths_are_guarded_like_their_decoded_form() {
    let auth = auth_service_issuing(unsigned_token(json!({"sub": "1", "binding_id": "b1"})));
    let app = build_app(test_config(&auth.base_url, &unreachable_url(), &[])).await;

    for path in ["/dash%62oard", "/%64ashboard/campaigns"] {
        let resp = test::call_service(&app, get(path, None)).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/login"), "{path}");
    }

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "lin@example.com", "password": "pw"}))
        .to_request();
    let cookie = response_cookie(&test::call_service(&app, login).await, SESSION_COOKIE).unwrap();

    let resp = test::call_service(&app, get("/%6cogin", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    auth.stop().await;
}

#[actix_web::test]
async fn test_decision_is_recorded_on_the_request() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;

    let resp = test::call_service(&app, get("/dashboard", None)).await;
    assert_eq!(
        resp.request().extensions().get::<GuardDecision>(),
        Some(&GuardDecision::Redirect("/login".into()))
    );

    let resp = test::call_service(&app, get("/health", None)).await;
    assert_eq!(
        resp.request().extensions().get::<GuardDecision>(),
        Some(&GuardDecision::Pass)
    );
}
