//! HTTP/WebSocket server for the web UI

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, get_service, post},
    Router,
};
use rust_embed::RustEmbed;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::UiConfig;
use crate::session::SessionController;
use crate::ui::handlers;
use crate::ui::websocket;

/// Static assets compiled into the binary
#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

/// Shared application state
pub struct AppState {
    pub controller: Arc<SessionController>,
}

impl AppState {
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self { controller }
    }
}

/// Web server for the tester page
pub struct WebServer {
    config: UiConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: UiConfig, controller: Arc<SessionController>) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(controller)),
        }
    }

    /// Get shared state
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router
    fn build_router(&self) -> Router {
        let router = Router::new()
            // API routes
            .route("/api/status", get(handlers::get_status))
            .route("/api/devices", get(handlers::get_devices))
            .route("/api/start", post(handlers::start_capture))
            .route("/api/stop", post(handlers::stop_capture))
            // WebSocket
            .route("/ws", get(websocket::websocket_handler))
            // Health check
            .route("/health", get(|| async { "OK" }));

        // Page assets: a static dir on disk when configured, the embedded
        // bundle otherwise.
        let router = match self.config.static_dir.clone() {
            Some(static_dir) => router.fallback_service(get_service(
                ServeDir::new(static_dir).append_index_html_on_directories(true),
            )),
            None => router.fallback(embedded_assets),
        };

        let router = if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        };

        router.with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn start(&self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.http_port)
            .parse()?;

        let router = self.build_router();

        tracing::info!("Web server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the web server in the background
    pub fn start_background(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.start().await })
    }
}

/// Serve an embedded asset, falling back to index.html for unknown paths
async fn embedded_assets(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => match Assets::get("index.html") {
            Some(content) => Response::builder()
                .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
            None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
        },
    }
}
