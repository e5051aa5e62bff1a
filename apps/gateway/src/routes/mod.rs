use actix_web::web;

use crate::config::GatewayConfig;

pub mod auth;
pub mod backend;
pub mod health;
pub mod pages;

/// Register every route. Shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig, config: &GatewayConfig) {
    cfg.configure(health::configure_routes);

    // Auth routes: /api/auth/**
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));

    // Relay: /api/backend/** with its own body limit
    cfg.service(
        web::scope(backend::BACKEND_PREFIX)
            .app_data(web::PayloadConfig::new(config.max_body_bytes))
            .configure(backend::configure_routes),
    );

    cfg.configure(|cfg| pages::configure_routes(cfg, &config.guard));
}
