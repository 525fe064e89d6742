//! Score-lag discrepancy detection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, instrument};

use super::correlator::{CorrelatedPair, CorrelationMode};

/// Which record's market flag decides whether a discrepancy is actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SuspensionAuthority {
    /// The signal-source record's market flag.
    Signal,
    /// The market-source record's market flag.
    #[default]
    Market,
}

/// Correlation and suspension settings for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionPolicy {
    /// Which team names must match.
    pub correlation: CorrelationMode,
    /// Which market flag gates alerts.
    pub authority: SuspensionAuthority,
}

/// Team whose score the signal source shows ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Home team.
    Home,
    /// Away team.
    Away,
}

/// A score lead of the signal source over the market source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    /// Side whose score is ahead on the signal source.
    pub side: Side,
    /// That side's goals on the signal source.
    pub signal_goals: u32,
    /// That side's goals on the market source.
    pub market_goals: u32,
}

/// Compare scores. The home side is checked first; the away side only when the
/// home side shows no lead.
pub fn score_advantage(pair: &CorrelatedPair<'_>) -> Option<Discrepancy> {
    let (signal, market) = (pair.signal, pair.market);

    if signal.home_score > market.home_score {
        Some(Discrepancy {
            side: Side::Home,
            signal_goals: signal.home_score,
            market_goals: market.home_score,
        })
    } else if signal.away_score > market.away_score {
        Some(Discrepancy {
            side: Side::Away,
            signal_goals: signal.away_score,
            market_goals: market.away_score,
        })
    } else {
        None
    }
}

/// Market flag that governs the pair under `authority`.
pub fn governing_market_open(pair: &CorrelatedPair<'_>, authority: SuspensionAuthority) -> bool {
    match authority {
        SuspensionAuthority::Signal => pair.signal.market_open,
        SuspensionAuthority::Market => pair.market.market_open,
    }
}

/// Return the discrepancy if the pair is actionable.
///
/// Every score lead is logged with the market record, even when the governing
/// market turns out to be suspended.
#[instrument(level = "debug", skip(pair), fields(fixture = %pair.signal.fixture()))]
pub fn detect(pair: &CorrelatedPair<'_>, authority: SuspensionAuthority) -> Option<Discrepancy> {
    let discrepancy = score_advantage(pair)?;

    info!(
        side = %discrepancy.side,
        signal_goals = discrepancy.signal_goals,
        market_goals = discrepancy.market_goals,
        market = ?pair.market,
        "Score lead over market source"
    );

    if !governing_market_open(pair, authority) {
        debug!(%authority, "Market suspended, not actionable");
        return None;
    }

    Some(discrepancy)
}

/// Check whether a pair is actionable.
pub fn is_actionable(pair: &CorrelatedPair<'_>, authority: SuspensionAuthority) -> bool {
    detect(pair, authority).is_some()
}

/// Keep the actionable pairs, each with its discrepancy.
pub fn find_actionable<'a>(
    pairs: &[CorrelatedPair<'a>],
    authority: SuspensionAuthority,
) -> Vec<(CorrelatedPair<'a>, Discrepancy)> {
    pairs
        .iter()
        .filter_map(|pair| detect(pair, authority).map(|d| (*pair, d)))
        .collect()
}
