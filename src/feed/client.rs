//! Live feed trait and shared HTTP plumbing for the provider clients.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::types::{NormalizedMatch, Source};
use crate::config::Config;
use crate::error::FeedError;
use crate::metrics;

/// Browser-like user agent; both providers reject obvious bots.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// A source of live match snapshots.
#[async_trait]
pub trait LiveFeed: Send + Sync {
    /// Provider behind this feed.
    fn source(&self) -> Source;

    /// Fetch and normalize the current live snapshot.
    async fn fetch(&self) -> Result<Vec<NormalizedMatch>, FeedError>;
}

/// Build the HTTP client shared by the feeds and the notifier.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http_timeout_ms))
        .connect_timeout(Duration::from_secs(5))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(USER_AGENT)
        .build()
}

/// Send a prepared request and decode the body as untyped JSON.
///
/// The body is kept untyped so the adapters can skip malformed entries
/// individually instead of failing the whole snapshot.
pub(crate) async fn get_json(
    feed: Source,
    request: reqwest::RequestBuilder,
) -> Result<Value, FeedError> {
    let start = Instant::now();

    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|error| FeedError::Http { feed, error })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            feed,
            status: status.as_u16(),
        });
    }

    let body: Value = response.json().await.map_err(|e| FeedError::Parse {
        feed,
        reason: e.to_string(),
    })?;

    metrics::record_feed_fetch_latency(start, feed);
    debug!(%feed, elapsed_ms = start.elapsed().as_millis() as u64, "Fetched live snapshot");

    Ok(body)
}

/// Milliseconds since the Unix epoch, used as a cache-busting query value.
pub(crate) fn cache_buster() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_builds_from_default_config() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[test]
    fn cache_buster_is_epoch_millis() {
        // 2020-01-01T00:00:00Z in milliseconds.
        assert!(cache_buster() > 1_577_836_800_000);
    }
}
