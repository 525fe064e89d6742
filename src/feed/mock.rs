//! Mock live feed for unit testing.
//!
//! This module provides a feed that can be used in tests
//! without making real network requests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::client::LiveFeed;
use super::types::{NormalizedMatch, Source};
use crate::error::FeedError;

/// Configuration for mock feed behavior.
#[derive(Debug, Clone, Default)]
pub struct MockFeedConfig {
    /// Whether fetches should fail with an HTTP status error.
    pub fail: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock feed returning a configurable snapshot.
#[derive(Debug, Clone)]
pub struct MockFeed {
    source: Source,
    config: MockFeedConfig,
    matches: Arc<Mutex<Vec<NormalizedMatch>>>,
    calls: Arc<AtomicUsize>,
}

impl MockFeed {
    /// Create a mock feed that returns `matches` on every fetch.
    pub fn new(source: Source, matches: Vec<NormalizedMatch>) -> Self {
        Self::with_config(source, matches, MockFeedConfig::default())
    }

    /// Create a mock feed with custom behavior.
    pub fn with_config(
        source: Source,
        matches: Vec<NormalizedMatch>,
        config: MockFeedConfig,
    ) -> Self {
        Self {
            source,
            config,
            matches: Arc::new(Mutex::new(matches)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock feed whose fetches always fail.
    pub fn failing(source: Source) -> Self {
        Self::with_config(
            source,
            Vec::new(),
            MockFeedConfig {
                fail: true,
                latency_ms: 0,
            },
        )
    }

    /// Replace the snapshot returned by later fetches.
    pub fn set_matches(&self, matches: Vec<NormalizedMatch>) {
        *self.matches.lock().unwrap() = matches;
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveFeed for MockFeed {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self) -> Result<Vec<NormalizedMatch>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail {
            return Err(FeedError::Status {
                feed: self.source,
                status: 503,
            });
        }

        Ok(self.matches.lock().unwrap().clone())
    }
}

/// Builder-style constructor for test records.
#[derive(Debug, Clone)]
pub struct MatchBuilder {
    record: NormalizedMatch,
}

impl MatchBuilder {
    /// Start a record for `home` vs `away` at 0-0 with an open market.
    pub fn new(source: Source, home: &str, away: &str) -> Self {
        Self {
            record: NormalizedMatch {
                source,
                home_team: home.to_string(),
                away_team: away.to_string(),
                home_score: 0,
                away_score: 0,
                league: "England".to_string(),
                tournament: "Premier League".to_string(),
                match_link: None,
                market_open: true,
            },
        }
    }

    /// Set the score.
    pub fn score(mut self, home: u32, away: u32) -> Self {
        self.record.home_score = home;
        self.record.away_score = away;
        self
    }

    /// Set the market flag.
    pub fn market_open(mut self, open: bool) -> Self {
        self.record.market_open = open;
        self
    }

    /// Set the review link.
    pub fn link(mut self, link: &str) -> Self {
        self.record.match_link = Some(link.to_string());
        self
    }

    /// Finish the record.
    pub fn build(self) -> NormalizedMatch {
        self.record
    }
}
