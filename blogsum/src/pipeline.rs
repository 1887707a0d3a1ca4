use anyhow::Context;
use common::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::dictionary::TranslationDictionary;
use crate::errors::PipelineError;
use crate::extraction::Extractor;
use crate::fetcher::{Fetcher, DEFAULT_USER_AGENT};
use crate::persistence::{BlogRecord, PersistenceCoordinator};
use crate::{summarizer, translator};

/// Response body of a successfully processed blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub title: String,
    pub summary: String,
    pub summary_translated: String,
    pub full_text: String,
    pub url: String,
}

impl From<BlogRecord> for BlogSummary {
    fn from(record: BlogRecord) -> Self {
        Self {
            title: record.title,
            summary: record.summary,
            summary_translated: record.summary_translated,
            full_text: record.full_text,
            url: record.blog_url,
        }
    }
}

/// Fetch, extract, summarize and translate, without touching any store.
#[derive(Clone)]
pub struct Analyzer {
    fetcher: Fetcher,
    extractor: Arc<Extractor>,
    dictionary: Arc<TranslationDictionary>,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher, extractor: Arc<Extractor>, dictionary: Arc<TranslationDictionary>) -> Self {
        Self {
            fetcher,
            extractor,
            dictionary,
        }
    }

    /// Build the fetcher, extractor and dictionary described by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let dictionary_path = config
            .dictionary
            .as_ref()
            .and_then(|d| d.path.as_deref())
            .map(Path::new);
        let dictionary = TranslationDictionary::load(dictionary_path).await?;

        let user_agent = config
            .fetch
            .as_ref()
            .and_then(|f| f.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT);
        let fetcher = Fetcher::with_user_agent(config.fetch_timeout(), user_agent)
            .context("failed to build HTTP client")?;

        let extraction = config.extraction.clone().unwrap_or_default();
        let extractor = Extractor::new(&extraction).context("invalid [extraction] configuration")?;
        info!(timeout = ?fetcher.timeout(), user_agent, "pipeline: analyzer ready");

        Ok(Self::new(fetcher, Arc::new(extractor), Arc::new(dictionary)))
    }

    pub fn dictionary(&self) -> &TranslationDictionary {
        &self.dictionary
    }

    pub async fn analyze(&self, url: &str, cancel: &CancellationToken) -> Result<BlogRecord, PipelineError> {
        let url = url.trim();
        let page = self.fetcher.fetch_cancellable(url, cancel).await?;

        let article = self.extractor.extract(&page.html, url)?;
        let summary = summarizer::summarize(&article.content);
        if summarizer::is_degenerate(&summary) {
            info!(url, "pipeline: article has no sentence long enough to summarize");
        }
        let summary_translated = translator::translate(&summary, &self.dictionary);

        Ok(BlogRecord {
            blog_url: url.to_string(),
            title: article.title,
            summary,
            summary_translated,
            full_text: article.content,
        })
    }
}

/// The full request path: analysis followed by persistence.
#[derive(Clone)]
pub struct Pipeline {
    analyzer: Analyzer,
    persistence: PersistenceCoordinator,
}

impl Pipeline {
    pub fn new(analyzer: Analyzer, persistence: PersistenceCoordinator) -> Self {
        Self { analyzer, persistence }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Process one blog URL end to end. Stages run strictly in sequence and
    /// `cancel` is honoured at every network or database wait.
    pub async fn process(&self, url: &str, cancel: &CancellationToken) -> Result<BlogSummary, PipelineError> {
        let span = info_span!("summarize", request_id = %Uuid::new_v4(), url = %url.trim());
        async {
            let record = self.analyzer.analyze(url, cancel).await?;
            let persisted = self.persistence.persist(&record, cancel).await?;
            info!(
                summary_id = persisted.id,
                archived = persisted.archived,
                "pipeline: blog processed"
            );
            Ok(BlogSummary::from(record))
        }
        .instrument(span)
        .await
    }
}
