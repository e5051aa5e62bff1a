#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod gateway;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

pub use config::GatewayConfig;
pub use error::AppError;
pub use extractors::CurrentSession;
pub use middleware::{RequestTrace, RouteGuard, SecurityHeaders, StructuredLogger, TraceSpan};
pub use session::Session;
pub use state::{AppState, SecurityConfig};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    gateway_test_support::logging::init();
}
