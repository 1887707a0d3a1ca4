mod support;

use blogsum::errors::PipelineError;
use blogsum::persistence::{BlogRecord, PersistenceCoordinator};
use blogsum::storage::{SqliteDocumentStore, SqliteSummaryStore};
use std::sync::Arc;
use std::time::Duration;
use support::{test_stores, TestStores};
use tokio_util::sync::CancellationToken;

fn coordinator(stores: &TestStores) -> PersistenceCoordinator {
    PersistenceCoordinator::new(
        Arc::new(SqliteSummaryStore::new(stores.summaries.clone())),
        Arc::new(SqliteDocumentStore::new(stores.archive.clone())),
    )
}

fn record() -> BlogRecord {
    BlogRecord {
        blog_url: "https://example.com/post".to_string(),
        title: "A Post".to_string(),
        summary: "A summary sentence that is long enough.".to_string(),
        summary_translated: "ایک summary sentence that is long enough.".to_string(),
        full_text: "A summary sentence that is long enough. More text follows here.".to_string(),
    }
}

#[tokio::test]
async fn test_persist_writes_both_stores() {
    let stores = test_stores().await;
    let persisted = coordinator(&stores)
        .persist(&record(), &CancellationToken::new())
        .await
        .expect("persist");

    assert!(persisted.archived);
    assert_eq!(stores.summary_count().await, 1);
    assert_eq!(stores.document_count().await, 1);
}

#[tokio::test]
async fn test_cancel_while_summary_write_is_blocked_leaves_no_row() {
    let stores = test_stores().await;
    let coordinator = coordinator(&stores);

    // Another writer holds the database lock, so the insert has to wait for it.
    let mut holder = stores.summaries.acquire().await.expect("acquire holder");
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *holder)
        .await
        .expect("take write lock");

    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { coordinator.persist(&record(), &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(100)).await;

    sqlx::query("ROLLBACK")
        .execute(&mut *holder)
        .await
        .expect("release write lock");
    drop(holder);

    let result = task.await.expect("persist task");
    assert!(matches!(result, Err(PipelineError::Cancelled)), "got {:?}", result);
    assert_eq!(stores.summary_count().await, 0);
    assert_eq!(stores.document_count().await, 0);
}
