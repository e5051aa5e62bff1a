use actix_web::{web, App, HttpServer};
use gateway::middleware::{RequestTrace, RouteGuard, SecurityHeaders, StructuredLogger, TraceSpan};
use gateway::{routes, telemetry, AppState, GatewayConfig};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment is provided by the runtime (container env, or sourced .env locally).
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    let host = app_state.config.bind_host.clone();
    let port = app_state.config.bind_port;
    info!(
        host = %host,
        port,
        google = app_state.google.is_some(),
        verifies_tokens = app_state.config.auth_token_secret.is_some(),
        "starting gateway"
    );

    let route_config = app_state.config.clone();
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        let route_config = route_config.clone();
        App::new()
            .wrap(RouteGuard)
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(move |cfg| routes::configure(cfg, &route_config))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
