//! Alert payloads and their chat text.

use serde::Serialize;

use crate::arbitrage::{CorrelatedPair, Discrepancy};
use crate::feed::Source;

/// Shown when the signal record carries no review link.
pub const NO_LINK_PLACEHOLDER: &str =
    "No Match Link Generated (Please, manually search it on sofascore)";

/// One actionable discrepancy, detached from the cycle's snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Provider whose score is ahead.
    pub source: Source,
    /// Tournament of the signal record.
    pub tournament: String,
    /// Home team, signal spelling.
    pub home_team: String,
    /// Away team, signal spelling.
    pub away_team: String,
    /// Signal score as "H - A".
    pub signal_score: String,
    /// Market score as "H - A".
    pub market_score: String,
    /// Review link, if any.
    pub match_link: Option<String>,
    /// What the signal source is ahead on.
    pub discrepancy: Discrepancy,
}

impl Alert {
    /// Build an alert from an actionable pair.
    pub fn from_pair(pair: &CorrelatedPair<'_>, discrepancy: Discrepancy) -> Self {
        let signal = pair.signal;
        Self {
            source: signal.source,
            tournament: signal.tournament.clone(),
            home_team: signal.home_team.clone(),
            away_team: signal.away_team.clone(),
            signal_score: signal.score_line(),
            market_score: pair.market.score_line(),
            match_link: signal.match_link.clone(),
            discrepancy,
        }
    }

    /// Chat message text. URL encoding is left to the transport.
    pub fn text(&self) -> String {
        format!(
            "GAME: {}\nTEAMS: {} vs {}\n{}: {}\nREVIEW: {}",
            self.tournament,
            self.home_team,
            self.away_team,
            self.source,
            self.signal_score,
            self.match_link.as_deref().unwrap_or(NO_LINK_PLACEHOLDER),
        )
    }
}
