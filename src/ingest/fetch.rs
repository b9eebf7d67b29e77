//! Dataset retrieval from a Socrata-style open-data endpoint
//!
//! Two requests per dataset: a row count from `{url}.json`, then at most
//! `min(requested, available)` rows of CSV from `{url}.csv`. The CSV body is
//! decoded on a blocking task while it is still arriving.

use super::table::{Table, TableError};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Response};
use serde_json::Value;
use std::io::{self, Read};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Rows between two progress ticks
const TICK_ROWS: usize = 10_000;

/// Body chunks buffered between the download and the CSV decoder
const CHUNK_BUFFER: usize = 64;

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),

    /// Network or HTTP status failure
    #[error("Network error: {0}")]
    Network(String),

    /// Row count body was not `[{"COUNT": n}]`
    #[error("Unexpected count response: {0}")]
    Count(String),

    /// CSV body could not be decoded
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Background download task failed
    #[error("Worker error: {0}")]
    Worker(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Progress of one background download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    /// Row count known; `limit` rows will be requested
    Started { available: usize, limit: usize },
    /// Rows decoded so far
    Rows(usize),
    /// Download finished with this many rows
    Finished(usize),
}

/// HTTP client for dataset endpoints
#[derive(Clone)]
pub struct DatasetFetcher {
    client: Client,
}

impl DatasetFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> FetchResult<Response> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Network(format!("{} returned {}", url, resp.status())));
        }
        Ok(resp)
    }

    /// Number of rows the endpoint reports
    pub async fn available(&self, url: &str) -> FetchResult<usize> {
        let body = self
            .send(&count_url(url))
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Count(e.to_string()))?;
        parse_count(&value)
    }

    /// Download up to `requested` rows
    pub async fn fetch(
        &self,
        url: &str,
        requested: usize,
        progress: Option<&mpsc::UnboundedSender<FetchProgress>>,
    ) -> FetchResult<Table> {
        let available = self.available(url).await?;
        let limit = requested.min(available);
        info!("Downloading {} data from {}", limit, url);
        notify(progress, FetchProgress::Started { available, limit });

        let mut resp = self.send(&csv_url(url, limit)).await?;
        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        let ticks = progress.cloned();
        let decoder = tokio::task::spawn_blocking(move || {
            Table::from_csv(ChunkReader::new(rx), |rows| {
                if rows % TICK_ROWS == 0 {
                    notify(ticks.as_ref(), FetchProgress::Rows(rows));
                }
            })
        });

        let mut interrupted = None;
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    // The decoder stops early on malformed input
                    if tx.send(chunk.to_vec()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    interrupted = Some(FetchError::Network(e.to_string()));
                    break;
                }
            }
        }
        drop(tx);

        let decoded = decoder
            .await
            .map_err(|e| FetchError::Worker(e.to_string()))?;
        if let Some(e) = interrupted {
            return Err(e);
        }
        let table = decoded?;

        notify(progress, FetchProgress::Finished(table.len()));
        Ok(table)
    }

    /// Run [`fetch`](Self::fetch) on a background task.
    ///
    /// The receiver yields progress until the task ends; await the handle
    /// for the table.
    pub fn spawn_fetch(
        &self,
        url: impl Into<String>,
        requested: usize,
    ) -> (
        JoinHandle<FetchResult<Table>>,
        mpsc::UnboundedReceiver<FetchProgress>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = self.clone();
        let url = url.into();

        let handle = tokio::spawn(async move { fetcher.fetch(&url, requested, Some(&tx)).await });
        (handle, rx)
    }
}

/// Blocking [`Read`] over body chunks sent from the download task
struct ChunkReader {
    chunks: mpsc::Receiver<Vec<u8>>,
    current: Vec<u8>,
    offset: usize,
}

impl ChunkReader {
    fn new(chunks: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            chunks,
            current: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset == self.current.len() {
            match self.chunks.blocking_recv() {
                Some(chunk) => {
                    self.current = chunk;
                    self.offset = 0;
                }
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.current.len() - self.offset);
        buf[..n].copy_from_slice(&self.current[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

fn notify(progress: Option<&mpsc::UnboundedSender<FetchProgress>>, event: FetchProgress) {
    if let Some(tx) = progress {
        // The receiver may have been dropped; progress is advisory
        let _ = tx.send(event);
    }
}

/// `{url}.json?$query=SELECT COUNT(*)`
pub fn count_url(url: &str) -> String {
    format!(
        "{}.json?$query={}",
        url,
        utf8_percent_encode("SELECT COUNT(*)", NON_ALPHANUMERIC)
    )
}

/// `{url}.csv?$limit={limit}`
pub fn csv_url(url: &str, limit: usize) -> String {
    format!("{}.csv?$limit={}", url, limit)
}

/// Extract the row count from a `[{"COUNT": n}]` body. The count may be a
/// JSON number or a decimal string.
pub fn parse_count(body: &Value) -> FetchResult<usize> {
    let count = body
        .as_array()
        .and_then(|rows| rows.first())
        .and_then(|row| row.get("COUNT"))
        .ok_or_else(|| FetchError::Count(body.to_string()))?;

    let parsed = match count {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        _ => None,
    };

    debug!("Endpoint reports {:?} rows", parsed);
    parsed.ok_or_else(|| FetchError::Count(count.to_string()))
}
