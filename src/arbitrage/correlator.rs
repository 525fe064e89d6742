//! Cross-provider match correlation by team-name similarity.

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::feed::NormalizedMatch;

/// Which team names must be similar for two records to correlate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CorrelationMode {
    /// Home names only. Looser, more false positives.
    HomeOnly,
    /// Home and away names.
    #[default]
    HomeAndAway,
}

/// One record from each source judged to be the same real-world match.
///
/// Borrows both snapshots, so it cannot outlive the cycle that built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatedPair<'a> {
    /// Record from the signal source.
    pub signal: &'a NormalizedMatch,
    /// Record from the market source.
    pub market: &'a NormalizedMatch,
}

/// Two names are similar when either contains the other (case-sensitive).
pub fn similar(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Check whether two records name the same fixture under `mode`.
pub fn teams_match(a: &NormalizedMatch, b: &NormalizedMatch, mode: CorrelationMode) -> bool {
    if !similar(&a.home_team, &b.home_team) {
        return false;
    }
    match mode {
        CorrelationMode::HomeOnly => true,
        CorrelationMode::HomeAndAway => similar(&a.away_team, &b.away_team),
    }
}

/// Pair every signal record with every market record it matches.
///
/// All pairs are kept: a signal record may correlate with several market records.
pub fn correlate<'a>(
    signal: &'a [NormalizedMatch],
    market: &'a [NormalizedMatch],
    mode: CorrelationMode,
) -> Vec<CorrelatedPair<'a>> {
    signal
        .iter()
        .flat_map(|s| {
            market
                .iter()
                .filter(move |m| teams_match(s, m, mode))
                .map(move |m| CorrelatedPair { signal: s, market: m })
        })
        .collect()
}
