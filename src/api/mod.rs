// src/api/mod.rs
//! REST API served to the browser client.
//!
//! - `/api/movies/...` movie listings, search, genres and details
//! - `/api/comments/...` comment threads; writes need a bearer token
//! - `/api/auth/...` registration and login
//! - `/health` liveness probe

pub mod auth;
pub mod comments;
pub mod extract;
pub mod movies;
pub mod response;
pub mod state;

pub use extract::{AuthUser, JsonBody, PathId};
pub use response::TOKEN_EXPIRED_HEADER;
pub use state::AppState;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, LOCATION},
        HeaderValue, Method,
    },
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;

use crate::error::AppError;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/movies/latest", get(movies::latest))
        .route("/api/movies/top-rated", get(movies::top_rated))
        .route("/api/movies/search", get(movies::search))
        .route("/api/movies/genres", get(movies::genres))
        .route("/api/movies/:id", get(movies::details))
        .route("/api/comments", post(comments::create))
        .route("/api/comments/movie/:movie_id", get(comments::by_movie))
        .route(
            "/api/comments/:id",
            get(comments::get_one)
                .put(comments::update)
                .delete(comments::delete),
        )
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Credentialed CORS for the single frontend origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| AppError::ConfigError(format!("Invalid CORS origin '{}': {}", origin, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([LOCATION, TOKEN_EXPIRED_HEADER])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60)))
}

pub struct ApiServer {
    port: u16,
    cors_origin: String,
    state: AppState,
}

impl ApiServer {
    pub fn new(port: u16, cors_origin: impl Into<String>, state: AppState) -> Self {
        Self {
            port,
            cors_origin: cors_origin.into(),
            state,
        }
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn start(self) -> anyhow::Result<()> {
        let app = create_router(self.state).layer(cors_layer(&self.cors_origin)?);

        let address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&address).await?;

        info!("🚀 API server listening on {}", address);
        info!("🌐 Accepting browser requests from {}", self.cors_origin);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("👋 API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_bad_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(matches!(cors_layer("bad\norigin"), Err(AppError::ConfigError(_))));
    }
}
