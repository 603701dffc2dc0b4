//! Comment rules on top of the repository: input validation, the
//! movie-exists check and author-only edits.

use log::{info, warn};
use std::sync::Arc;

use crate::catalog::MovieService;
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment};
use crate::storage::CommentRepository;

pub const MIN_COMMENT_CHARS: usize = 3;
pub const MAX_COMMENT_CHARS: usize = 1000;

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    movies: Arc<dyn MovieService>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, movies: Arc<dyn MovieService>) -> Self {
        Self { repo, movies }
    }

    pub async fn for_movie(&self, movie_id: i64) -> Result<Vec<Comment>> {
        self.repo.comments_for_movie(movie_id).await
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        self.repo
            .comment_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))
    }

    pub async fn create(&self, user_id: &str, movie_id: i64, content: &str) -> Result<Comment> {
        validate_movie_id(movie_id)?;
        let content = validate_content(content)?;

        match self.movies.movie_details(movie_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Validation("Invalid movie ID".to_string()))
            }
            Err(e) => return Err(e),
        }

        let comment = self
            .repo
            .add_comment(NewComment {
                movie_id,
                user_id: user_id.to_string(),
                content,
            })
            .await?;
        info!("💬 Comment {} added to movie {} by {}", comment.id, movie_id, user_id);
        Ok(comment)
    }

    pub async fn update(&self, user_id: &str, id: i64, content: &str) -> Result<Comment> {
        self.owned_by(user_id, id).await?;
        let content = validate_content(content)?;

        self.repo
            .update_comment(id, &content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))
    }

    pub async fn delete(&self, user_id: &str, id: i64) -> Result<()> {
        self.owned_by(user_id, id).await?;

        if !self.repo.delete_comment(id).await? {
            return Err(AppError::NotFound(format!("Comment {}", id)));
        }
        info!("🗑️ Comment {} deleted by {}", id, user_id);
        Ok(())
    }

    async fn owned_by(&self, user_id: &str, id: i64) -> Result<Comment> {
        let comment = self.get(id).await?;
        if comment.user_id != user_id {
            warn!("User {} tried to modify comment {} owned by {}", user_id, id, comment.user_id);
            return Err(AppError::Forbidden(
                "You can only modify your own comments".to_string(),
            ));
        }
        Ok(comment)
    }
}

fn validate_movie_id(movie_id: i64) -> Result<()> {
    if movie_id <= 0 {
        return Err(AppError::Validation("MovieId must be greater than 0".to_string()));
    }
    Ok(())
}

/// Returns the trimmed content.
fn validate_content(content: &str) -> Result<String> {
    let trimmed = content.trim();
    let chars = trimmed.chars().count();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    if !(MIN_COMMENT_CHARS..=MAX_COMMENT_CHARS).contains(&chars) {
        return Err(AppError::Validation(format!(
            "Comment must be between {} and {} characters",
            MIN_COMMENT_CHARS, MAX_COMMENT_CHARS
        )));
    }
    Ok(trimmed.to_string())
}
