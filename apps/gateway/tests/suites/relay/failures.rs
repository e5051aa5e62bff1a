// Local failures versus relayed backend errors.

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, HttpResponse};
use gateway_test_support::assert_problem_details;

use crate::support::upstream::{unreachable_url, CallCount, StubServer};
use crate::support::{build_app, test_config};

#[actix_web::test]
async fn test_unreachable_backend_is_marked_gateway_failure() {
    let app = build_app(test_config(&unreachable_url(), &unreachable_url(), &[])).await;

    let req = test::TestRequest::get().uri("/api/backend/products").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("x-gateway-error").unwrap(),
        "upstream-unavailable"
    );
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;
    let problem = assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::BAD_GATEWAY,
        "GATEWAY_UPSTREAM_UNAVAILABLE",
        Some("Service unavailable"),
    );
    assert!(!problem.detail.contains("127.0.0.1"));
}

#[actix_web::test]
async fn test_slow_backend_times_out_as_gateway_failure() {
    let backend = StubServer::start(|cfg| {
        cfg.route(
            "/slow",
            web::get().to(|| async {
                actix_web::rt::time::sleep(Duration::from_secs(3)).await;
                HttpResponse::Ok().finish()
            }),
        );
    });
    let app = build_app(test_config(
        &unreachable_url(),
        &backend.base_url,
        &[("UPSTREAM_TIMEOUT_MS", "200")],
    ))
    .await;

    let started = std::time::Instant::now();
    let req = test::TestRequest::get().uri("/api/backend/slow").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(resp.headers().get("x-gateway-error").is_some());
    assert!(started.elapsed() < Duration::from_secs(2));

    backend.stop().await;
}

#[actix_web::test]
async fn test_backend_502_is_relayed_without_gateway_marker() {
    let backend = StubServer::start(|cfg| {
        cfg.route(
            "/flaky",
            web::get().to(|| async { HttpResponse::BadGateway().body("upstream of backend down") }),
        );
    });
    let app = build_app(test_config(&unreachable_url(), &backend.base_url, &[])).await;

    let req = test::TestRequest::get().uri("/api/backend/flaky").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(resp.headers().get("x-gateway-error").is_none());
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"upstream of backend down");

    backend.stop().await;
}

#[actix_web::test]
async fn test_body_over_limit_is_rejected_locally() {
    let app = build_app(test_config(
        &unreachable_url(),
        &unreachable_url(),
        &[("GATEWAY_MAX_BODY_BYTES", "16")],
    ))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/backend/upload")
        .set_payload(vec![b'x'; 64])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn test_dot_segments_never_leave_the_backend_base_path() {
    let calls = CallCount::default();
    let counter = calls.clone();
    let backend = StubServer::start(move |cfg| {
        let counter = counter.clone();
        cfg.default_service(web::to(move || {
            counter.hit();
            async { HttpResponse::Ok().body("reached") }
        }));
    });
    let base = backend.url("/api");
    let app = build_app(test_config(&unreachable_url(), &base, &[])).await;

    for uri in [
        "/api/backend/%2e%2e/admin/secret",
        "/api/backend/items/%2E%2e/%2e%2e/admin",
        "/api/backend/.%2e/admin",
        "/api/backend/../admin",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.headers().get("x-gateway-error").is_none(), "{uri}");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = test::read_body(resp).await;
        assert_problem_details(
            status,
            &headers,
            &body,
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            None,
        );
    }
    assert_eq!(calls.get(), 0);

    let req = test::TestRequest::get().uri("/api/backend/items").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(calls.get(), 1);

    backend.stop().await;
}
