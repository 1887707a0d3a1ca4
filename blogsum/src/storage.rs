use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::StoreError;

/// Collection the full texts land in unless `[archive] collection` says otherwise.
pub const DEFAULT_COLLECTION: &str = "full_texts";

/// Row of the structured store (system of record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub blog_url: String,
    pub title: String,
    pub summary: String,
    pub summary_translated: String,
    pub created_at: DateTime<Utc>,
}

/// Document written to the full-text archive. `summary_id` points at the
/// `summaries` row written before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullTextRecord {
    pub blog_url: String,
    pub title: String,
    pub full_text: String,
    pub summary_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Structured store: insert a summary and get its generated id back.
///
/// An in-flight write cannot be abandoned by dropping its future, so `cancel` is
/// handed to the store instead: when it has fired by the time the row is written,
/// the write must be rolled back and `StoreError::Cancelled` returned.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn insert_summary(
        &self,
        record: &SummaryRecord,
        cancel: &CancellationToken,
    ) -> Result<i64, StoreError>;
}

/// Document store: insert-only archive of full article texts.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_document(&self, record: &FullTextRecord) -> Result<i64, StoreError>;
}

/// Ensure the `summaries` table exists. Idempotent, safe to call at startup.
pub async fn ensure_summary_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    info!("storage: ensuring summaries schema");
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            blog_url TEXT NOT NULL,
            title TEXT NOT NULL,
            summary TEXT NOT NULL,
            summary_translated TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_summaries_blog_url ON summaries(blog_url)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Ensure the `documents` table backing the archive exists.
/// Documents are schema-less JSON bodies grouped by collection.
pub async fn ensure_archive_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    info!("storage: ensuring archive schema");
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            summary_id INTEGER NOT NULL,
            body TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_summary ON documents(collection, summary_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SqliteSummaryStore {
    pool: SqlitePool,
}

impl SqliteSummaryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for SqliteSummaryStore {
    async fn insert_summary(
        &self,
        record: &SummaryRecord,
        cancel: &CancellationToken,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO summaries (blog_url, title, summary, summary_translated, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.blog_url)
        .bind(&record.title)
        .bind(&record.summary)
        .bind(&record.summary_translated)
        .bind(record.created_at)
        .fetch_one(&mut tx)
        .await?;

        if cancel.is_cancelled() {
            tx.rollback().await?;
            info!(url = %record.blog_url, "storage: summary rolled back, request cancelled");
            return Err(StoreError::Cancelled);
        }
        tx.commit().await?;

        info!(id, url = %record.blog_url, "storage: stored summary");
        Ok(id)
    }
}

/// JSON document archive on top of a pooled SQLite database.
///
/// The pool is shared across requests; each insert runs in its own transaction,
/// which is rolled back and its connection returned to the pool if the insert
/// does not reach `commit`.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_collection(pool, DEFAULT_COLLECTION)
    }

    pub fn with_collection(pool: SqlitePool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert_document(&self, record: &FullTextRecord) -> Result<i64, StoreError> {
        let body = serde_json::to_string(record)?;

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO documents (collection, summary_id, body, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&self.collection)
        .bind(record.summary_id)
        .bind(&body)
        .bind(record.created_at)
        .fetch_one(&mut tx)
        .await?;
        tx.commit().await?;

        debug!(id, summary_id = record.summary_id, collection = %self.collection, "storage: archived full text");
        Ok(id)
    }
}
