//! Real HTTP servers standing in for the auth service, Google and the
//! backend.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Map, Value};

pub struct StubServer {
    pub base_url: String,
    handle: ServerHandle,
}

impl StubServer {
    /// Serve the routes registered by `configure` on a random local port.
    pub fn start<F>(configure: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");

        let server = HttpServer::new(move || App::new().configure(configure.clone()))
            .workers(1)
            .disable_signals()
            .listen(listener)
            .expect("stub listen")
            .run();

        let handle = server.handle();
        tokio::spawn(server);

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

/// Shared call counter for a stub route.
#[derive(Clone, Default)]
pub struct CallCount(Arc<AtomicUsize>);

impl CallCount {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Auth service whose `/auth/login` answers 200 with `Set-Cookie: jwt=<token>`.
pub fn auth_service_issuing(token: String) -> StubServer {
    StubServer::start(move |cfg| {
        let token = token.clone();
        cfg.route(
            "/auth/login",
            web::post().to(move || {
                let token = token.clone();
                async move {
                    HttpResponse::Ok()
                        .append_header(("set-cookie", "theme=dark; Path=/"))
                        .append_header(("set-cookie", format!("jwt={token}; Path=/; HttpOnly")))
                        .json(json!({"ok": true}))
                }
            }),
        );
    })
}

/// Echo of what the gateway sent: method, path, query, headers, body.
pub async fn echo(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let mut headers = Map::new();
    for (name, value) in req.headers() {
        let entry = headers
            .entry(name.as_str().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = entry {
            values.push(Value::String(value.to_str().unwrap_or_default().to_string()));
        }
    }

    HttpResponse::Ok().json(json!({
        "method": req.method().as_str(),
        "path": req.uri().path(),
        "query": req.uri().query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}
