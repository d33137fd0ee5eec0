use crate::errors::{AppError, AppResult};
use crate::models::Snapshot;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type CollectorFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

const STREAMERS_PATH: &str = "streamers";

/// Source of streamer snapshots. Failures come back as values; nothing past
/// this boundary panics on a bad response.
pub trait CollectorSource: Send + Sync {
    /// Reads the current record set.
    fn fetch_snapshot(&self) -> CollectorFuture<'_, Snapshot>;

    /// Asks the collector to recompute its data. Returns no records; a later
    /// fetch observes the result.
    fn request_refresh(&self) -> CollectorFuture<'_, ()>;
}

/// Collector reached over HTTP at `<base>/streamers`.
#[derive(Debug, Clone)]
pub struct HttpCollector {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCollector {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("Failed to build HTTP client: {}", error))
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, STREAMERS_PATH)
    }

    async fn get_snapshot(&self) -> AppResult<Snapshot> {
        let url = self.endpoint();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("GET {} failed: {}", url, error)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("GET {} returned {}", url, status)));
        }

        let body = response.text().await?;
        decode_snapshot(&body)
    }

    async fn post_refresh(&self) -> AppResult<()> {
        let url = self.endpoint();
        let response = self
            .client
            .post(&url)
            .body("")
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("POST {} failed: {}", url, error)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("POST {} returned {}", url, status)));
        }
        Ok(())
    }
}

impl CollectorSource for HttpCollector {
    fn fetch_snapshot(&self) -> CollectorFuture<'_, Snapshot> {
        Box::pin(self.get_snapshot())
    }

    fn request_refresh(&self) -> CollectorFuture<'_, ()> {
        Box::pin(self.post_refresh())
    }
}

/// Decodes a collector body, which must be a JSON array of records.
pub fn decode_snapshot(body: &str) -> AppResult<Snapshot> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|error| AppError::Decode(format!("Response is not valid JSON: {}", error)))?;
    if !value.is_array() {
        return Err(AppError::Decode("Response is not a JSON array".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}
