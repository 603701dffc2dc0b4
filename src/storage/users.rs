use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::{AppError, Result};
use crate::models::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, user_name: &str, password_hash: &str) -> Result<User>;

    /// Email match is case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

pub struct SqliteUserStore {
    db: Database,
}

impl SqliteUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct UserRow {
    id: String,
    email: String,
    user_name: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            user_name: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            email: self.email,
            user_name: self.user_name,
            password_hash: self.password_hash,
        })
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create_user(&self, email: &str, user_name: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            user_name: user_name.trim().to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        let row = user.clone();
        self.db
            .run(move |conn| {
                let inserted = conn.execute(
                    "INSERT INTO users (id, email, user_name, password_hash, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        row.id,
                        row.email,
                        row.user_name,
                        row.password_hash,
                        format_timestamp(&row.created_at),
                    ],
                );
                match inserted {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == ErrorCode::ConstraintViolation =>
                    {
                        Err(AppError::Conflict(format!(
                            "Email '{}' is already taken.",
                            row.email
                        )))
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        info!("👤 Registered user {}", user.id);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_string();
        let row = self
            .db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, email, user_name, password_hash, created_at
                         FROM users WHERE email = ?1",
                        params![email],
                        UserRow::from_row,
                    )
                    .optional()?)
            })
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}
