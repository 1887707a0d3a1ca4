#![allow(dead_code)]

use async_trait::async_trait;
use blogsum::dictionary::TranslationDictionary;
use blogsum::errors::StoreError;
use blogsum::extraction::Extractor;
use blogsum::fetcher::Fetcher;
use blogsum::persistence::PersistenceCoordinator;
use blogsum::pipeline::{Analyzer, Pipeline};
use blogsum::storage::{
    ensure_archive_schema, ensure_summary_schema, DocumentStore, FullTextRecord,
    SqliteDocumentStore, SqliteSummaryStore,
};
use common::{init_db_pool, ExtractionConfig};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const TITLE: &str = "Understanding Modern Web Development";
pub const FIRST: &str = "Modern web development has evolved significantly over the past decade";
pub const LONGEST: &str = "With the rise of frameworks like React and Vue, developers now have powerful tools to create dynamic and interactive user interfaces";
pub const LAST: &str = "The future of web development looks promising with emerging technologies";

pub fn article_html() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{TITLE} | Example Blog</title>
    <meta property="og:title" content="OG title that should lose">
    <script>window.analytics = {{ track: function() {{}} }};</script>
</head>
<body>
    <header><a href="/">Example Blog</a></header>
    <nav><a href="/about">About</a> <a href="/archive">Archive</a></nav>
    <div class="post-header"><h1>{TITLE}</h1></div>
    <article>
        <p>{FIRST}.</p>
        <p>{LONGEST}.</p>
        <div class="ads">Buy our product today!</div>
        <p>Cloud computing has changed how we deploy applications.</p>
        <p>{LAST}.</p>
        <div class="related-posts"><a href="/other">Another post you might like</a></div>
    </article>
    <aside class="sidebar">Subscribe to the newsletter</aside>
    <footer>Copyright 2024 Example Blog</footer>
</body>
</html>"#
    )
}

pub fn expected_summary() -> String {
    format!("{FIRST}. {LONGEST}. {LAST}.")
}

pub fn analyzer(timeout: Duration) -> Analyzer {
    Analyzer::new(
        Fetcher::new(timeout).expect("build fetcher"),
        Arc::new(Extractor::new(&ExtractionConfig::default()).expect("default extractor")),
        Arc::new(TranslationDictionary::bundled().expect("bundled dictionary")),
    )
}

/// Both stores on SQLite files inside a temp dir that lives as long as this value.
pub struct TestStores {
    pub dir: TempDir,
    pub summaries: SqlitePool,
    pub archive: SqlitePool,
}

pub async fn test_stores() -> TestStores {
    let dir = tempfile::tempdir().expect("tempdir");
    let summaries_path = dir.path().join("blogsum.db").to_string_lossy().to_string();
    let archive_path = dir.path().join("archive.db").to_string_lossy().to_string();

    let summaries = init_db_pool(&summaries_path).await.expect("init summaries pool");
    ensure_summary_schema(&summaries).await.expect("summaries schema");
    let archive = init_db_pool(&archive_path).await.expect("init archive pool");
    ensure_archive_schema(&archive).await.expect("archive schema");

    TestStores {
        dir,
        summaries,
        archive,
    }
}

impl TestStores {
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with_documents(Arc::new(SqliteDocumentStore::new(self.archive.clone())))
    }

    pub fn pipeline_with_documents(&self, documents: Arc<dyn DocumentStore>) -> Pipeline {
        let persistence = PersistenceCoordinator::new(
            Arc::new(SqliteSummaryStore::new(self.summaries.clone())),
            documents,
        );
        Pipeline::new(analyzer(Duration::from_secs(5)), persistence)
    }

    pub async fn summary_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
            .fetch_one(&self.summaries)
            .await
            .expect("count summaries")
    }

    pub async fn document_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.archive)
            .await
            .expect("count documents")
    }
}

/// Document store that is always down.
pub struct FailingDocuments;

#[async_trait]
impl DocumentStore for FailingDocuments {
    async fn insert_document(&self, _record: &FullTextRecord) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
