//! Stand-in pages for the login screen and the protected area, so the
//! guard's redirects land somewhere real.

use actix_web::{web, HttpResponse};

use crate::config::GuardConfig;
use crate::extractors::CurrentSession;

async fn login_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Sign in")
}

async fn dashboard_page(CurrentSession(session): CurrentSession) -> HttpResponse {
    let who = session
        .name
        .or(session.email)
        .unwrap_or_else(|| "signed in".to_string());
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Dashboard ({who})"))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, guard: &GuardConfig) {
    cfg.route(&guard.login_path, web::get().to(login_page))
        .route(&guard.dashboard_path, web::get().to(dashboard_page));
}
