use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::{AppState, AuthUser, JsonBody, PathId};
use crate::error::AppError;
use crate::models::Comment;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCommentRequest {
    pub movie_id: i64,
    pub content: String,
}

/// `id` is optional; when sent it has to match the path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCommentRequest {
    pub id: Option<i64>,
    pub content: String,
}

pub async fn by_movie(
    State(state): State<AppState>,
    PathId(movie_id): PathId,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.comments.for_movie(movie_id).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(state.comments.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = state
        .comments
        .create(&user.id, request.movie_id, &request.content)
        .await?;
    let location = format!("/api/comments/{}", comment.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(comment)))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(id): PathId,
    JsonBody(request): JsonBody<UpdateCommentRequest>,
) -> Result<StatusCode, AppError> {
    if request.id.is_some_and(|body_id| body_id != id) {
        return Err(AppError::Validation("Comment ID mismatch".to_string()));
    }
    state.comments.update(&user.id, id, &request.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    state.comments.delete(&user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
