#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use movieapp_server::{
    auth::TokenIssuer,
    catalog::{GenreService, MovieService, StaticGenreService},
    create_router,
    error::{AppError, Result},
    models::Movie,
    storage::Database,
    AppState,
};

pub const JWT_KEY: &str = "integration-test-key-0123456789abcdef";
pub const PASSWORD: &str = "ValidPass123!";

/// A small fixed catalog: Fight Club (550) and The Matrix (603).
pub struct FakeMovies;

pub fn fight_club() -> Movie {
    Movie {
        id: 550,
        title: "Fight Club".to_string(),
        genre_ids: vec![18],
        genres: vec!["Drama".to_string()],
        vote_average: 8.4,
        ..Default::default()
    }
}

pub fn the_matrix() -> Movie {
    Movie {
        id: 603,
        title: "The Matrix".to_string(),
        genre_ids: vec![28, 878],
        genres: vec!["Action".to_string(), "Science Fiction".to_string()],
        vote_average: 8.2,
        ..Default::default()
    }
}

#[async_trait]
impl MovieService for FakeMovies {
    async fn latest_movies(&self) -> Result<Vec<Movie>> {
        Ok(vec![the_matrix(), fight_club()])
    }

    async fn top_rated_movies(&self) -> Result<Vec<Movie>> {
        Ok(vec![fight_club(), the_matrix()])
    }

    async fn search_movies(&self, query: Option<&str>, genre: Option<&str>) -> Result<Vec<Movie>> {
        let query = query.map(str::to_lowercase).unwrap_or_default();
        let genre = genre.map(str::to_lowercase).unwrap_or_default();
        if query.trim().is_empty() && genre.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok([fight_club(), the_matrix()]
            .into_iter()
            .filter(|m| query.is_empty() || m.title.to_lowercase().contains(&query))
            .filter(|m| genre.is_empty() || m.genres.iter().any(|g| g.to_lowercase() == genre))
            .collect())
    }

    async fn movie_details(&self, id: i64) -> Result<Movie> {
        match id {
            550 => Ok(fight_club()),
            603 => Ok(the_matrix()),
            500 => Err(AppError::CircuitBreakerOpen),
            _ => Err(AppError::NotFound(format!("Movie {}", id))),
        }
    }
}

pub fn token_issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(
        JWT_KEY,
        "movieapp",
        "movieapp-client",
        Duration::hours(1),
    ))
}

pub fn test_app() -> (Router, Arc<TokenIssuer>) {
    let db = Database::open_in_memory().expect("in-memory database");
    let movies: Arc<dyn MovieService> = Arc::new(FakeMovies);
    let genres: Arc<dyn GenreService> = Arc::new(StaticGenreService::new());
    let tokens = token_issuer();
    let state = AppState::new(db, movies, genres, tokens.clone());
    (create_router(state), tokens)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    send_raw(app, method, uri, token, body.map(|body| body.to_string())).await
}

/// Like [`send`], but the body goes out byte for byte as given.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, headers, json)
}

/// Registers `email` and returns its bearer token.
pub async fn register(app: &Router, email: &str) -> String {
    let (status, _, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "confirmPassword": PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}
