//! Error taxonomy for the summarize pipeline.
//!
//! Each stage has its own error enum; `PipelineError` folds them together and
//! owns the user-facing wording.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out")]
    Timeout,

    #[error("page returned HTTP {status}")]
    HttpError { status: u16 },

    #[error("network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("fetch cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("insufficient content: {length} characters extracted, at least {required} required")]
    InsufficientContent { length: usize, required: usize },

    #[error("invalid selector '{0}'")]
    InvalidSelector(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),

    #[error("write rolled back: request cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("page returned HTTP {status}")]
    HttpError { status: u16 },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("failed to persist summary: {0}")]
    PersistenceFailed(#[source] StoreError),

    #[error("request cancelled")]
    Cancelled,
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUrl { url, reason } => PipelineError::InvalidUrl { url, reason },
            FetchError::Timeout => PipelineError::Timeout,
            FetchError::HttpError { status } => PipelineError::HttpError { status },
            FetchError::NetworkError(e) => PipelineError::NetworkError(e),
            FetchError::Cancelled => PipelineError::Cancelled,
        }
    }
}

impl PipelineError {
    /// Message suitable for showing to the person who submitted the URL.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InvalidUrl { .. } => "Please provide a valid HTTP or HTTPS URL".to_string(),
            PipelineError::Timeout => "The webpage took too long to load".to_string(),
            PipelineError::HttpError { status } => {
                format!("Unable to fetch the webpage (HTTP {})", status)
            }
            PipelineError::NetworkError(_) => "Unable to fetch the webpage".to_string(),
            PipelineError::Extraction(ExtractionError::InsufficientContent { .. }) => {
                "Could not extract enough readable content from the webpage".to_string()
            }
            PipelineError::Extraction(ExtractionError::InvalidSelector(_))
            | PipelineError::PersistenceFailed(_) => "Failed to process blog".to_string(),
            PipelineError::Cancelled => "The request was cancelled".to_string(),
        }
    }

    /// True when the caller sent something we can never process, as opposed to a
    /// failure on our side or the remote site's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::InvalidUrl { .. })
    }
}
