//! Normalized match records and the raw market shapes shared by both providers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::status::MissingMarketPolicy;

/// Category name the market source uses for simulated matches.
pub const VIRTUAL_LEAGUE_MARKER: &str = "Simulated Reality League";

/// Check whether a category name marks a simulated/virtual league.
pub fn is_virtual_league(category: &str) -> bool {
    category == VIRTUAL_LEAGUE_MARKER
}

/// Live-data provider a record came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Live-score site whose scores update first (signal role).
    #[strum(to_string = "Sofascore", serialize = "sofascore")]
    Sofascore,
    /// Bookmaker exposing the tradeable market (market role).
    #[strum(to_string = "Sportybet", serialize = "sportybet")]
    Sportybet,
}

/// Provider-independent view of one live match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedMatch {
    /// Provider that produced this record.
    pub source: Source,
    /// Home team, provider spelling.
    pub home_team: String,
    /// Away team, provider spelling.
    pub away_team: String,
    /// Current home score.
    pub home_score: u32,
    /// Current away score.
    pub away_score: u32,
    /// Category/league name.
    pub league: String,
    /// Tournament name.
    pub tournament: String,
    /// Page to review the match on, if one could be built.
    pub match_link: Option<String>,
    /// Whether the Home/Away market still accepts bets.
    pub market_open: bool,
}

impl NormalizedMatch {
    /// Score formatted as "H - A".
    pub fn score_line(&self) -> String {
        format!("{} - {}", self.home_score, self.away_score)
    }

    /// Fixture formatted as "Home vs Away".
    pub fn fixture(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Options shared by the provider adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterOptions {
    /// Market state assumed when a record has no market data.
    pub missing_market: MissingMarketPolicy,
}

/// `isActive` arrives as a boolean from one provider and as 0/1 from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActiveFlag {
    /// Boolean form.
    Bool(bool),
    /// Integer form, non-zero means active.
    Int(i64),
}

impl ActiveFlag {
    /// Whether the flag means active.
    pub fn is_active(self) -> bool {
        match self {
            ActiveFlag::Bool(b) => b,
            ActiveFlag::Int(n) => n != 0,
        }
    }
}

/// One named outcome of a market.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketOutcome {
    /// Outcome label ("Home", "Draw", "Away", ...).
    #[serde(default)]
    pub desc: Option<String>,
    /// Whether the outcome can currently be bet on.
    #[serde(default, rename = "isActive")]
    pub is_active: Option<ActiveFlag>,
}

impl MarketOutcome {
    /// Build an outcome with a boolean active flag.
    pub fn new(desc: &str, active: bool) -> Self {
        Self {
            desc: Some(desc.to_string()),
            is_active: Some(ActiveFlag::Bool(active)),
        }
    }

    /// Whether the outcome is marked active. Missing flags count as inactive.
    pub fn active(&self) -> bool {
        self.is_active.is_some_and(ActiveFlag::is_active)
    }
}

/// Market block embedded in a raw event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMarket {
    /// Outcomes of the market. `None` when the provider omitted them.
    #[serde(default)]
    pub outcomes: Option<Vec<MarketOutcome>>,
}

/// Trim a provider team name and reject empty ones.
pub(crate) fn team_name(raw: &str) -> Result<String, crate::error::NormalizeError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(crate::error::NormalizeError::EmptyTeamName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_flag_accepts_bool_and_int() {
        let outcomes: Vec<MarketOutcome> = serde_json::from_str(
            r#"[{"desc":"Home","isActive":1},{"desc":"Away","isActive":false},{"desc":"Draw"}]"#,
        )
        .unwrap();

        assert!(outcomes[0].active());
        assert!(!outcomes[1].active());
        assert!(!outcomes[2].active());
    }

    #[test]
    fn virtual_league_marker_is_exact() {
        assert!(is_virtual_league("Simulated Reality League"));
        assert!(!is_virtual_league("simulated reality league"));
        assert!(!is_virtual_league("Premier League"));
    }

    #[test]
    fn team_name_rejects_blank() {
        assert!(team_name("  ").is_err());
        assert_eq!(team_name(" Arsenal ").unwrap(), "Arsenal");
    }

    #[test]
    fn source_display_and_parse() {
        use std::str::FromStr;
        assert_eq!(Source::Sofascore.to_string(), "Sofascore");
        assert_eq!(Source::from_str("sportybet").unwrap(), Source::Sportybet);
    }
}
