//! HTTP server module for the WebSocket endpoint and static pages.
//!
//! `/ws` carries the live scoreboard; everything not matched by a route is
//! served from the public directory (display and admin pages).

pub mod hub;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod ws;

use crate::error::ServerError;
use crate::server::routes::{health, points};
use crate::server::state::AppState;
use crate::server::ws::ws_handler;

use axum::{routing::get, Router};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Builds the application router.
pub fn router(state: Arc<AppState>, public_dir: &Path) -> Router {
    // CORS layer for pages opened from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/points", get(points::get_points))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and returns the listener, so callers can learn the real port.
pub async fn bind(addr: std::net::SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("HTTP server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
