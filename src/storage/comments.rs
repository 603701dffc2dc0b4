use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentAuthor, NewComment};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Newest first.
    async fn comments_for_movie(&self, movie_id: i64) -> Result<Vec<Comment>>;

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>>;

    async fn add_comment(&self, comment: NewComment) -> Result<Comment>;

    /// `None` when no comment has that id.
    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>>;

    /// `false` when no comment has that id.
    async fn delete_comment(&self, id: i64) -> Result<bool>;
}

pub struct SqliteCommentRepository {
    db: Database,
}

impl SqliteCommentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const SELECT_COMMENT: &str = "
    SELECT c.id, c.movie_id, c.user_id, c.content, c.created_at, c.updated_at, u.user_name
    FROM comments c
    JOIN users u ON u.id = c.user_id";

struct CommentRow {
    id: i64,
    movie_id: i64,
    user_id: String,
    content: String,
    created_at: String,
    updated_at: Option<String>,
    user_name: String,
}

impl CommentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            movie_id: row.get(1)?,
            user_id: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            user_name: row.get(6)?,
        })
    }

    fn into_comment(self) -> Result<Comment> {
        Ok(Comment {
            id: self.id,
            movie_id: self.movie_id,
            user_id: self.user_id,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: self.updated_at.as_deref().map(parse_timestamp).transpose()?,
            user: CommentAuthor {
                user_name: self.user_name,
            },
        })
    }
}

fn select_by_id(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    let sql = format!("{} WHERE c.id = ?1", SELECT_COMMENT);
    conn.query_row(&sql, params![id], CommentRow::from_row)
        .optional()?
        .map(CommentRow::into_comment)
        .transpose()
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn comments_for_movie(&self, movie_id: i64) -> Result<Vec<Comment>> {
        let rows = self
            .db
            .run(move |conn| {
                let sql = format!(
                    "{} WHERE c.movie_id = ?1 ORDER BY c.created_at DESC, c.id DESC",
                    SELECT_COMMENT
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![movie_id], CommentRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        debug!("Loaded {} comments for movie {}", rows.len(), movie_id);
        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
        self.db.run(move |conn| select_by_id(conn, id)).await
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        let created_at = format_timestamp(&Utc::now());
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO comments (movie_id, user_id, content, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![comment.movie_id, comment.user_id, comment.content, created_at],
                )?;
                let id = conn.last_insert_rowid();
                select_by_id(conn, id)?.ok_or_else(|| {
                    AppError::StorageError(format!("Comment {} missing after insert", id))
                })
            })
            .await
    }

    async fn update_comment(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let content = content.to_string();
        let updated_at = format_timestamp(&Utc::now());
        self.db
            .run(move |conn| {
                let changed = conn.execute(
                    "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
                    params![content, updated_at, id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                select_by_id(conn, id)
            })
            .await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        self.db
            .run(move |conn| {
                let removed = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
                Ok(removed > 0)
            })
            .await
    }
}
