use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::FetchError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The URL that was requested
    pub url: Url,
    /// The URL the response came from after redirects
    pub final_url: Url,
    pub status: u16,
    pub html: String,
}

/// Single-attempt page fetcher with browser-like headers and a hard timeout.
///
/// The inner `reqwest::Client` is built once and shared, so clones of a `Fetcher`
/// reuse the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

/// Parse `raw` and accept only absolute http(s) URLs.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::NetworkError(err)
    }
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .build()
            .map_err(FetchError::NetworkError)?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the page at `url`. One attempt, no retry.
    pub async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let url = validate_url(url)?;
        // The client timeout already bounds the request; the outer bound also covers
        // a body that trickles in forever.
        match tokio::time::timeout(self.timeout, self.get(url.clone())).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%url, timeout = ?self.timeout, "fetch: timed out");
                Err(FetchError::Timeout)
            }
        }
    }

    /// Like [`Fetcher::fetch`], but gives up with `Cancelled` as soon as `cancel` fires.
    pub async fn fetch_cancellable(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RawPage, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(url, "fetch: cancelled");
                Err(FetchError::Cancelled)
            }
            result = self.fetch(url) => result,
        }
    }

    async fn get(&self, url: Url) -> Result<RawPage, FetchError> {
        debug!(%url, "fetch: sending request");
        let response = self.client.get(url.clone()).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "fetch: non-success status");
            return Err(FetchError::HttpError {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(classify)?;
        info!(%url, bytes = html.len(), "fetch: page downloaded");

        Ok(RawPage {
            url,
            final_url,
            status: status.as_u16(),
            html,
        })
    }
}
