//! Alert delivery with per-message results.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::message::Alert;
use crate::error::NotifyError;
use crate::metrics;

/// Outbound messaging transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether credentials are present. Unconfigured notifiers are skipped.
    fn is_configured(&self) -> bool;

    /// Deliver one text message.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Outcome of delivering one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum Delivery {
    /// Accepted by the messaging API.
    Sent,
    /// Not attempted: notifier has no credentials.
    Skipped,
    /// Attempted and failed.
    Failed(String),
}

/// Aggregated delivery results for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Messages accepted.
    pub sent: usize,
    /// Messages skipped for missing credentials.
    pub skipped: usize,
    /// Messages that failed.
    pub failed: usize,
    /// Per-alert outcome, in alert order.
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    fn record(&mut self, delivery: Delivery) {
        match &delivery {
            Delivery::Sent => self.sent += 1,
            Delivery::Skipped => self.skipped += 1,
            Delivery::Failed(_) => self.failed += 1,
        }
        self.deliveries.push(delivery);
    }
}

/// Formats alerts and hands them to a [`Notifier`].
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("configured", &self.notifier.is_configured())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher over a notifier.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Deliver every alert concurrently. A failed message never stops the others.
    pub async fn dispatch(&self, alerts: &[Alert]) -> DispatchReport {
        let mut report = DispatchReport::default();
        if alerts.is_empty() {
            return report;
        }

        if !self.notifier.is_configured() {
            warn!(
                count = alerts.len(),
                "BOT_TOKEN or CHAT_ID missing, skipping notifications"
            );
            for _ in alerts {
                report.record(Delivery::Skipped);
                metrics::inc_notifications_skipped();
            }
            return report;
        }

        let sends = alerts.iter().map(|alert| async move {
            let text = alert.text();
            match self.notifier.send(&text).await {
                Ok(()) => {
                    info!(home = %alert.home_team, away = %alert.away_team, "Message sent");
                    metrics::inc_notifications_sent();
                    Delivery::Sent
                }
                Err(e) => {
                    warn!(
                        home = %alert.home_team,
                        away = %alert.away_team,
                        error = %e,
                        "Failed to send message"
                    );
                    metrics::inc_notifications_failed();
                    Delivery::Failed(e.to_string())
                }
            }
        });

        for delivery in join_all(sends).await {
            report.record(delivery);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::mock::RecordingNotifier;
    use crate::arbitrage::{Discrepancy, Side};
    use crate::feed::Source;
    use pretty_assertions::assert_eq;

    fn alert(home: &str) -> Alert {
        Alert {
            source: Source::Sofascore,
            tournament: "Premier League".to_string(),
            home_team: home.to_string(),
            away_team: "Chelsea".to_string(),
            signal_score: "1 - 0".to_string(),
            market_score: "0 - 0".to_string(),
            match_link: None,
            discrepancy: Discrepancy {
                side: Side::Home,
                signal_goals: 1,
                market_goals: 0,
            },
        }
    }

    #[tokio::test]
    async fn failure_does_not_abort_batch() {
        let notifier = Arc::new(RecordingNotifier::failing_on("Fulham"));
        let dispatcher = Dispatcher::new(notifier.clone());

        let report = dispatcher
            .dispatch(&[alert("Arsenal"), alert("Fulham"), alert("Everton")])
            .await;

        assert_eq!((report.sent, report.skipped, report.failed), (2, 0, 1));
        assert!(matches!(report.deliveries[1], Delivery::Failed(_)));
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_notifier_skips_everything() {
        let notifier = Arc::new(RecordingNotifier::unconfigured());
        let dispatcher = Dispatcher::new(notifier.clone());

        let report = dispatcher.dispatch(&[alert("Arsenal"), alert("Fulham")]).await;

        assert_eq!(
            report,
            DispatchReport {
                sent: 0,
                skipped: 2,
                failed: 0,
                deliveries: vec![Delivery::Skipped, Delivery::Skipped],
            }
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_empty_report() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingNotifier::new()));
        assert_eq!(dispatcher.dispatch(&[]).await, DispatchReport::default());
    }
}
