//! Sportybet adapter: the market source.
//!
//! Events are grouped by tournament. Each event carries a `"H:A"` score string and
//! the 1X2 market whose Home/Away outcomes tell whether betting is suspended.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::client::{cache_buster, get_json, LiveFeed};
use super::status::market_open;
use super::types::{
    is_virtual_league, team_name, AdapterOptions, NormalizedMatch, RawMarket, Source,
};
use crate::error::{FeedError, NormalizeError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTournament {
    category_name: String,
    name: String,
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    home_team_name: String,
    away_team_name: String,
    #[serde(default)]
    set_score: Option<String>,
    #[serde(default)]
    markets: Option<Vec<RawMarket>>,
}

/// Parse a `"H:A"` score string into `(home, away)`.
pub fn parse_score(score: &str) -> Result<(u32, u32), NormalizeError> {
    let malformed = || NormalizeError::MalformedScore(score.to_string());

    let (home, away) = score.split_once(':').ok_or_else(malformed)?;
    let home = home.trim().parse::<u32>().map_err(|_| malformed())?;
    let away = away.trim().parse::<u32>().map_err(|_| malformed())?;

    Ok((home, away))
}

/// Normalize a `{ "data": [tournament, ...] }` snapshot.
///
/// Malformed tournaments and events are skipped individually; a payload without
/// a `data` list yields no records.
pub fn normalize(raw: &Value, options: &AdapterOptions) -> Vec<NormalizedMatch> {
    let Some(tournaments) = raw.get("data").and_then(Value::as_array) else {
        debug!("Sportybet payload has no data list");
        return Vec::new();
    };

    let mut matches = Vec::new();

    for entry in tournaments {
        let tournament = match RawTournament::deserialize(entry) {
            Ok(t) => t,
            Err(e) => {
                debug!(error = %e, "Skipping malformed Sportybet tournament");
                continue;
            }
        };

        if is_virtual_league(&tournament.category_name) {
            continue;
        }

        for entry in &tournament.events {
            let record = RawEvent::deserialize(entry)
                .map_err(|e| NormalizeError::Malformed(e.to_string()))
                .and_then(|event| normalize_event(event, &tournament, options));

            match record {
                Ok(record) => matches.push(record),
                Err(e) => debug!(
                    tournament = %tournament.name,
                    error = %e,
                    "Skipping Sportybet event"
                ),
            }
        }
    }

    matches
}

fn normalize_event(
    event: RawEvent,
    tournament: &RawTournament,
    options: &AdapterOptions,
) -> Result<NormalizedMatch, NormalizeError> {
    let score = event
        .set_score
        .as_deref()
        .ok_or_else(|| NormalizeError::Malformed("setScore missing".to_string()))?;
    let (home_score, away_score) = parse_score(score)?;

    Ok(NormalizedMatch {
        source: Source::Sportybet,
        home_team: team_name(&event.home_team_name)?,
        away_team: team_name(&event.away_team_name)?,
        home_score,
        away_score,
        league: tournament.category_name.clone(),
        tournament: tournament.name.clone(),
        match_link: None,
        market_open: market_open(event.markets.as_deref(), options.missing_market),
    })
}

/// Live football feed from Sportybet.
#[derive(Debug, Clone)]
pub struct SportybetFeed {
    http: reqwest::Client,
    url: String,
    sport_id: String,
    options: AdapterOptions,
}

impl SportybetFeed {
    /// Create a feed reading the given events endpoint for one sport.
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        sport_id: impl Into<String>,
        options: AdapterOptions,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            sport_id: sport_id.into(),
            options,
        }
    }
}

#[async_trait]
impl LiveFeed for SportybetFeed {
    fn source(&self) -> Source {
        Source::Sportybet
    }

    #[instrument(skip(self), fields(url = %self.url, sport_id = %self.sport_id))]
    async fn fetch(&self) -> Result<Vec<NormalizedMatch>, FeedError> {
        let request = self.http.get(&self.url).query(&[
            ("sportId", self.sport_id.clone()),
            ("_t", cache_buster().to_string()),
        ]);

        let raw = get_json(Source::Sportybet, request).await?;
        let matches = normalize(&raw, &self.options);
        info!(count = matches.len(), "Total Sportybet live matches");
        Ok(matches)
    }
}
