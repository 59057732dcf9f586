pub mod error;
pub mod routes;

pub use error::HttpError;

use axum::routing::{get, post};
use axum::Router;
use nakshatra_narration::{Narrator, Storyteller};
use tokio::net::TcpListener;

/// Shared, read-only handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub narrator: Narrator,
    pub storyteller: Storyteller,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/narration", post(routes::narration))
        .route("/api/narration/character", post(routes::character_narration))
        .route("/api/lore", post(routes::lore))
        .route("/api/hero-pov", post(routes::hero_pov))
        .route("/api/generate-text", post(routes::generate_text))
        .with_state(state)
}

/// Serve on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "narration server listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
}
