use axum::{
    extract::{Query, State},
    Json,
};
use log::debug;
use serde::Deserialize;

use super::{AppState, PathId};
use crate::error::AppError;
use crate::models::{Genre, Movie};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub genre: Option<String>,
}

pub async fn latest(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.movies.latest_movies().await?))
}

pub async fn top_rated(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.movies.top_rated_movies().await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Movie>>, AppError> {
    debug!("🔍 Movie search: {:?}", params);
    let movies = state
        .movies
        .search_movies(params.query.as_deref(), params.genre.as_deref())
        .await?;
    Ok(Json(movies))
}

pub async fn genres(State(state): State<AppState>) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(state.genres.all_genres().await?))
}

pub async fn details(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Movie>, AppError> {
    Ok(Json(state.movies.movie_details(id).await?))
}
