//! Poll orchestrator: fetch, correlate, detect and dispatch.
//!
//! One cycle runs at a time. The timer loop and the push endpoint share a
//! single-flight guard, so a push arriving mid-cycle waits for the running
//! cycle to finish. Nothing a cycle does is fatal to the process: failed feeds
//! degrade to empty snapshots and failed messages are reported, not raised.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::alert::{Alert, DispatchReport, Dispatcher, TelegramNotifier};
use crate::arbitrage::{correlate, find_actionable, DetectionPolicy};
use crate::config::Config;
use crate::error::FeedError;
use crate::feed::{
    build_http_client, LiveFeed, NormalizedMatch, SofascoreFeed, Source, SportybetFeed,
};
use crate::metrics::{self, LatencyTimer};

/// How cycles are triggered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunMode {
    /// Fetch both feeds on a fixed interval.
    #[default]
    Poll,
    /// Wait for the signal snapshot on `POST /api/setevents`.
    Push,
}

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trigger {
    /// Interval timer.
    Timer,
    /// Inbound signal snapshot.
    Push,
    /// One-shot CLI scan.
    Manual,
}

/// Summary of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// What started the cycle.
    pub trigger: Trigger,
    /// Cycle start, RFC 3339.
    pub started_at: String,
    /// Wall time from taking the cycle guard to the end of dispatch.
    pub elapsed_ms: u64,
    /// Signal records after normalization.
    pub signal_matches: usize,
    /// Market records after normalization.
    pub market_matches: usize,
    /// Correlated pairs.
    pub correlated: usize,
    /// Feeds that failed or timed out this cycle.
    pub failed_feeds: Vec<Source>,
    /// Actionable alerts.
    pub alerts: Vec<Alert>,
    /// Delivery results.
    pub dispatch: DispatchReport,
}

impl CycleReport {
    /// Number of actionable alerts.
    pub fn actionable(&self) -> usize {
        self.alerts.len()
    }
}

/// Aggregate counters across cycles, plus a copy of the most recent report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleStats {
    /// Cycles completed.
    pub cycles: u64,
    /// Feed fetches that failed or timed out.
    pub feed_failures: u64,
    /// Actionable alerts detected.
    pub alerts_detected: u64,
    /// Notifications sent.
    pub notifications_sent: u64,
    /// Notifications skipped for missing credentials.
    pub notifications_skipped: u64,
    /// Notifications that failed.
    pub notifications_failed: u64,
    /// Most recent cycle, including its alerts.
    pub last_cycle: Option<CycleReport>,
}

impl CycleStats {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.feed_failures += report.failed_feeds.len() as u64;
        self.alerts_detected += report.alerts.len() as u64;
        self.notifications_sent += report.dispatch.sent as u64;
        self.notifications_skipped += report.dispatch.skipped as u64;
        self.notifications_failed += report.dispatch.failed as u64;
        self.last_cycle = Some(report.clone());
    }
}

/// Runs the fetch → correlate → detect → dispatch pipeline.
pub struct Orchestrator {
    signal: Arc<dyn LiveFeed>,
    market: Arc<dyn LiveFeed>,
    dispatcher: Dispatcher,
    policy: DetectionPolicy,
    fetch_timeout: Duration,
    notify: bool,
    guard: Mutex<()>,
    stats: RwLock<CycleStats>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("signal", &self.signal.source())
            .field("market", &self.market.source())
            .field("policy", &self.policy)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("notify", &self.notify)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators.
    pub fn new(
        signal: Arc<dyn LiveFeed>,
        market: Arc<dyn LiveFeed>,
        dispatcher: Dispatcher,
        policy: DetectionPolicy,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            signal,
            market,
            dispatcher,
            policy,
            fetch_timeout,
            notify: true,
            guard: Mutex::new(()),
            stats: RwLock::new(CycleStats::default()),
        }
    }

    /// Wire the Sofascore and Sportybet feeds and the Telegram notifier from config.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let http = build_http_client(config)?;
        let options = config.adapter_options();

        let signal = SofascoreFeed::new(http.clone(), &config.signal_feed_url, options);
        let market = SportybetFeed::new(
            http.clone(),
            &config.market_feed_url,
            &config.market_sport_id,
            options,
        );
        let notifier = TelegramNotifier::new(http, config.telegram());

        Ok(Self::new(
            Arc::new(signal),
            Arc::new(market),
            Dispatcher::new(Arc::new(notifier)),
            config.detection_policy(),
            Duration::from_millis(config.fetch_timeout_ms),
        ))
    }

    /// Enable or disable notification delivery. Disabled cycles still detect.
    pub fn with_notifications(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Detection policy in use.
    pub fn policy(&self) -> DetectionPolicy {
        self.policy
    }

    /// Snapshot of the aggregate counters.
    pub async fn stats(&self) -> CycleStats {
        self.stats.read().await.clone()
    }

    /// Fetch both feeds concurrently and run one cycle.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleReport {
        let _flight = self.guard.lock().await;
        let timer = metrics::timer_cycle();
        let started_at = now_rfc3339();

        let (signal, market) = tokio::join!(
            self.fetch(self.signal.as_ref()),
            self.fetch(self.market.as_ref()),
        );

        let mut failed_feeds = Vec::new();
        let signal = signal.unwrap_or_else(|feed| {
            failed_feeds.push(feed);
            Vec::new()
        });
        let market = market.unwrap_or_else(|feed| {
            failed_feeds.push(feed);
            Vec::new()
        });

        self.process(trigger, timer, started_at, &signal, &market, failed_feeds)
            .await
    }

    /// Run one cycle with a signal snapshot delivered inbound.
    #[instrument(skip_all, fields(signal_matches = signal.len()))]
    pub async fn run_with_signal(&self, signal: Vec<NormalizedMatch>) -> CycleReport {
        let _flight = self.guard.lock().await;
        let timer = metrics::timer_cycle();
        let started_at = now_rfc3339();

        metrics::add_matches_normalized(self.signal.source(), signal.len());

        let mut failed_feeds = Vec::new();
        let market = self.fetch(self.market.as_ref()).await.unwrap_or_else(|feed| {
            failed_feeds.push(feed);
            Vec::new()
        });

        self.process(
            Trigger::Push,
            timer,
            started_at,
            &signal,
            &market,
            failed_feeds,
        )
        .await
    }

    /// Run timer-driven cycles until `shutdown` resolves. The first cycle runs
    /// immediately.
    pub async fn run_forever<F>(self: Arc<Self>, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_secs = interval.as_secs(), "Starting poll loop");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Poll loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle(Trigger::Timer).await;
                }
            }
        }
    }

    /// Fetch one feed under the cycle timeout. Errors are logged and reduced to
    /// the failing source.
    async fn fetch(&self, feed: &dyn LiveFeed) -> Result<Vec<NormalizedMatch>, Source> {
        let source = feed.source();

        let result = match tokio::time::timeout(self.fetch_timeout, feed.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout {
                feed: source,
                timeout_ms: self.fetch_timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(matches) => {
                metrics::add_matches_normalized(source, matches.len());
                Ok(matches)
            }
            Err(e) => {
                warn!(
                    feed = %source,
                    error = %e,
                    "Error fetching data, continuing with empty snapshot"
                );
                metrics::inc_feed_failures(source);
                Err(source)
            }
        }
    }

    /// Correlate, detect and dispatch. `timer` was started before the fetches and
    /// records the whole cycle when it drops here.
    async fn process(
        &self,
        trigger: Trigger,
        timer: LatencyTimer,
        started_at: String,
        signal: &[NormalizedMatch],
        market: &[NormalizedMatch],
        failed_feeds: Vec<Source>,
    ) -> CycleReport {
        metrics::inc_cycles(trigger.into());

        let pairs = correlate(signal, market, self.policy.correlation);
        let actionable = find_actionable(&pairs, self.policy.authority);
        metrics::add_pairs_correlated(pairs.len());
        metrics::add_alerts_detected(actionable.len());

        let alerts: Vec<Alert> = actionable
            .iter()
            .map(|(pair, discrepancy)| Alert::from_pair(pair, *discrepancy))
            .collect();

        let dispatch = if self.notify {
            self.dispatcher.dispatch(&alerts).await
        } else {
            debug!(count = alerts.len(), "Notifications disabled, not dispatching");
            DispatchReport::default()
        };

        let report = CycleReport {
            trigger,
            started_at,
            elapsed_ms: timer.elapsed_ms() as u64,
            signal_matches: signal.len(),
            market_matches: market.len(),
            correlated: pairs.len(),
            failed_feeds,
            alerts,
            dispatch,
        };

        info!(
            %trigger,
            signal = report.signal_matches,
            market = report.market_matches,
            correlated = report.correlated,
            actionable = report.actionable(),
            sent = report.dispatch.sent,
            failed = report.dispatch.failed,
            "Cycle complete"
        );

        self.stats.write().await.absorb(&report);
        report
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
