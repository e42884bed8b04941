//! HTTP server implementation using Axum.

use crate::handler::{
    handle_health, handle_initial_projects, handle_panic, handle_projects, handle_readme,
};
use axum::{routing::get, Router};
use folio_core::ProjectService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    /// Project listings and README cache
    pub projects: ProjectService,
}

/// Build the router with every route and middleware layer attached.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/projects", get(handle_projects))
        .route("/api/projects/initial", get(handle_initial_projects))
        .route("/api/projects/readme", get(handle_readme))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    projects: ProjectService,
    host: &str,
    port: u16,
) -> anyhow::Result<SocketAddr> {
    let app = build_router(Arc::new(AppState { projects }));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
