//! Catalog persistence
//!
//! The content trees are documents, not relational data: courses and
//! shared-content aggregates are stored as JSON blobs and deserialized
//! whole. The `CatalogQuery` trait is the read-only tree-query seam the
//! locator depends on, so tests can substitute an in-memory fixture.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

use crate::error::Result;

use super::types::{Course, SharedContent};

/// Read-only access to the content trees
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn courses(&self) -> Result<Vec<Course>>;
    async fn shared_contents(&self) -> Result<Vec<SharedContent>>;
}

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;

    Ok(pool)
}

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Course trees, one JSON document per course
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Shared-content trees referenced by one or more courses
CREATE TABLE IF NOT EXISTS shared_contents (
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQLite-backed catalog store
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_docs<T: serde::de::DeserializeOwned>(rows: Vec<sqlx::sqlite::SqliteRow>) -> Vec<T> {
        rows.into_iter()
            .filter_map(|row| {
                let id: String = row.get("id");
                let doc: String = row.get("doc");
                match serde_json::from_str(&doc) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        // A malformed document must not take down every
                        // lookup; skip it and say which one.
                        tracing::warn!(id = %id, error = %e, "Skipping unparseable catalog document");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl CatalogQuery for SqliteCatalog {
    async fn courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query("SELECT id, doc FROM courses")
            .fetch_all(&self.pool)
            .await?;
        Ok(Self::parse_docs(rows))
    }

    async fn shared_contents(&self) -> Result<Vec<SharedContent>> {
        let rows = sqlx::query("SELECT id, doc FROM shared_contents")
            .fetch_all(&self.pool)
            .await?;
        Ok(Self::parse_docs(rows))
    }
}
