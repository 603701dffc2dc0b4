//! Schema migrations, applied in order and recorded in `schema_version`.

use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

type Migration = fn(&Connection) -> Result<()>;

const MIGRATIONS: [(u32, &str, Migration); 2] = [
    (1, "users", v001_users),
    (2, "comments", v002_comments),
];

pub const LATEST_VERSION: u32 = MIGRATIONS.len() as u32;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        ",
    )?;

    let current = current_version(conn)?;
    for (version, name, migrate) in MIGRATIONS.iter() {
        if *version <= current {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        migrate(&tx)?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            params![version, name],
        )?;
        tx.commit()?;
        info!("Applied migration v{:03} ({})", version, name);
    }
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<u32>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

fn v001_users(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            user_name     TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

fn v002_comments(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_id    INTEGER NOT NULL,
            user_id     TEXT NOT NULL,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_comments_movie ON comments(movie_id);
        ",
    )?;
    Ok(())
}
