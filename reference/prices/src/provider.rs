//! Price source trait and implementations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::record::{decode_records, PriceRecord};

/// Trait for price feeds.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch every record the feed currently publishes.
    async fn fetch_records(&self) -> LoadResult<Vec<PriceRecord>>;
}

/// Price feed served as a JSON array over HTTP.
pub struct HttpPriceSource {
    client: Client,
    url: String,
}

impl HttpPriceSource {
    /// Create a source for `url`, with an optional request timeout.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.into(),
        }
    }

    fn transport(&self, e: reqwest::Error) -> LoadError {
        LoadError::Transport {
            source_name: self.url.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_records(&self) -> LoadResult<Vec<PriceRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                source_name: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport(e))?;
        debug!(url = %self.url, bytes = body.len(), "Fetched price feed");

        decode_records(&body)
    }
}

/// Price feed read from a local JSON file.
pub struct FilePriceSource {
    path: PathBuf,
}

impl FilePriceSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceSource for FilePriceSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_records(&self) -> LoadResult<Vec<PriceRecord>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Io {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(path = %self.path.display(), bytes = body.len(), "Read price file");

        decode_records(&body)
    }
}

/// In-memory price source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticPriceSource {
    records: parking_lot::RwLock<LoadResult<Vec<PriceRecord>>>,
    delay: Option<Duration>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticPriceSource {
    /// Create a source that always returns `records`.
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self {
            records: parking_lot::RwLock::new(Ok(records)),
            delay: None,
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a source from symbol/price pairs.
    pub fn with_prices<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, rust_decimal::Decimal)>,
    ) -> Self {
        Self::new(pairs.into_iter().map(|(s, p)| PriceRecord::new(s, p)).collect())
    }

    /// Create a source whose fetch always fails.
    pub fn failing(error: LoadError) -> Self {
        let source = Self::new(Vec::new());
        source.set_result(Err(error));
        source
    }

    /// Wait this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace what subsequent fetches return.
    pub fn set_result(&self, result: LoadResult<Vec<PriceRecord>>) {
        *self.records.write() = result;
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_records(&self) -> LoadResult<Vec<PriceRecord>> {
        self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records.read().clone()
    }
}
