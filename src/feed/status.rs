//! Open/suspended evaluation for a two-way Home/Away market.

use serde::Deserialize;
use strum::{Display, EnumString};
use tracing::trace;

use super::types::{MarketOutcome, RawMarket};

/// Market state assumed for a record that carries no market data at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MissingMarketPolicy {
    /// Treat the market as still accepting bets.
    Open,
    /// Treat the market as suspended.
    #[default]
    Closed,
}

impl MissingMarketPolicy {
    /// Market-open flag implied by this policy.
    pub fn is_open(self) -> bool {
        matches!(self, MissingMarketPolicy::Open)
    }
}

/// A market is open only if both the Home and the Away outcome exist and are active.
pub fn is_open(outcomes: &[MarketOutcome]) -> bool {
    let find = |label: &str| outcomes.iter().find(|o| o.desc.as_deref() == Some(label));

    match (find("Home"), find("Away")) {
        (Some(home), Some(away)) => home.active() && away.active(),
        _ => false,
    }
}

/// Resolve the market flag of a raw event.
///
/// Only the first market is inspected. A missing market array, an empty one, or a
/// first market without an outcome list falls back to `missing`.
pub fn market_open(markets: Option<&[RawMarket]>, missing: MissingMarketPolicy) -> bool {
    match markets.and_then(|m| m.first()).and_then(|m| m.outcomes.as_deref()) {
        Some(outcomes) => is_open(outcomes),
        None => {
            trace!(policy = %missing, "No market data on record");
            missing.is_open()
        }
    }
}
