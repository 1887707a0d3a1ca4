use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{PipelineError, StoreError};
use crate::storage::{DocumentStore, FullTextRecord, SummaryRecord, SummaryStore};

/// Everything produced for one blog post, ready to be written out.
#[derive(Debug, Clone)]
pub struct BlogRecord {
    pub blog_url: String,
    pub title: String,
    pub summary: String,
    pub summary_translated: String,
    pub full_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSummary {
    /// Id assigned by the structured store
    pub id: i64,
    /// Whether the full text made it into the document store
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Writes the summary to the system of record, then archives the full text.
///
/// The summary write is mandatory; the archive write is best effort and its
/// failure only downgrades `archived` to `false`.
#[derive(Clone)]
pub struct PersistenceCoordinator {
    summaries: Arc<dyn SummaryStore>,
    documents: Arc<dyn DocumentStore>,
}

impl PersistenceCoordinator {
    pub fn new(summaries: Arc<dyn SummaryStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { summaries, documents }
    }

    pub async fn persist(
        &self,
        record: &BlogRecord,
        cancel: &CancellationToken,
    ) -> Result<PersistedSummary, PipelineError> {
        let created_at = Utc::now();
        let summary = SummaryRecord {
            blog_url: record.blog_url.clone(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            summary_translated: record.summary_translated.clone(),
            created_at,
        };

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        // Not raced against `cancel`: a dropped sqlx write can still commit. The store
        // rolls back itself when the token fires before commit.
        let id = match self.summaries.insert_summary(&summary, cancel).await {
            Ok(id) => id,
            Err(StoreError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => return Err(PipelineError::PersistenceFailed(e)),
        };

        let document = FullTextRecord {
            blog_url: record.blog_url.clone(),
            title: record.title.clone(),
            full_text: record.full_text.clone(),
            summary_id: id,
            created_at,
        };

        // The summary is already committed at this point, so a cancelled or failed
        // archive write does not fail the request.
        let archived = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(summary_id = id, "persistence: cancelled before archiving full text");
                false
            }
            result = self.documents.insert_document(&document) => match result {
                Ok(doc_id) => {
                    info!(summary_id = id, doc_id, "persistence: full text archived");
                    true
                }
                Err(e) => {
                    warn!(summary_id = id, error = %e, "persistence: failed to archive full text, continuing");
                    false
                }
            }
        };

        Ok(PersistedSummary {
            id,
            archived,
            created_at,
        })
    }
}
