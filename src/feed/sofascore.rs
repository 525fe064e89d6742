//! Sofascore adapter: the signal source.
//!
//! Sofascore's live scores usually move before the bookmaker reacts, so its
//! records are the "signal" side of every correlated pair. The same event shape
//! arrives either from the live endpoint or pushed to `POST /api/setevents`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::client::{get_json, LiveFeed};
use super::status::market_open;
use super::types::{
    is_virtual_league, team_name, AdapterOptions, NormalizedMatch, RawMarket, Source,
};
use crate::error::{FeedError, NormalizeError};

const SOFASCORE_BASE_URL: &str = "https://www.sofascore.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    home_team: RawTeam,
    away_team: RawTeam,
    home_score: RawScore,
    away_score: RawScore,
    tournament: RawTournament,
    #[serde(default)]
    season: Option<RawId>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    custom_id: Option<String>,
    #[serde(default)]
    markets: Option<Vec<RawMarket>>,
    #[serde(default)]
    data: Option<RawEventData>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(default)]
    current: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawTournament {
    name: String,
    #[serde(default)]
    id: Option<u64>,
    category: RawCategory,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawId {
    #[serde(default)]
    id: Option<u64>,
}

/// Odds attached under `data` by some event payloads.
#[derive(Debug, Deserialize)]
struct RawEventData {
    #[serde(default)]
    markets: Option<Vec<RawMarket>>,
}

/// Normalize a `{ "events": [...] }` snapshot.
///
/// Entries that fail to parse are skipped; a payload without an `events` list
/// yields no records.
pub fn normalize(raw: &Value, options: &AdapterOptions) -> Vec<NormalizedMatch> {
    let Some(events) = raw.get("events").and_then(Value::as_array) else {
        debug!("Sofascore payload has no events list");
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|entry| {
            let event = match RawEvent::deserialize(entry) {
                Ok(event) => event,
                Err(e) => {
                    debug!(error = %e, "Skipping malformed Sofascore event");
                    return None;
                }
            };
            match normalize_event(event, options) {
                Ok(record) => record,
                Err(e) => {
                    debug!(error = %e, "Skipping Sofascore event");
                    None
                }
            }
        })
        .collect()
}

/// Normalize a raw JSON body. Invalid JSON yields no records.
pub fn normalize_bytes(body: &[u8], options: &AdapterOptions) -> Vec<NormalizedMatch> {
    match serde_json::from_slice::<Value>(body) {
        Ok(raw) => normalize(&raw, options),
        Err(e) => {
            debug!(error = %e, "Sofascore payload is not JSON");
            Vec::new()
        }
    }
}

/// `Ok(None)` means the event was deliberately excluded (virtual league).
fn normalize_event(
    event: RawEvent,
    options: &AdapterOptions,
) -> Result<Option<NormalizedMatch>, NormalizeError> {
    if is_virtual_league(&event.tournament.category.name) {
        return Ok(None);
    }

    let home_score = event
        .home_score
        .current
        .ok_or_else(|| NormalizeError::Malformed("homeScore.current missing".to_string()))?;
    let away_score = event
        .away_score
        .current
        .ok_or_else(|| NormalizeError::Malformed("awayScore.current missing".to_string()))?;

    let markets = event
        .markets
        .as_deref()
        .or_else(|| event.data.as_ref().and_then(|d| d.markets.as_deref()));
    let market_open = market_open(markets, options.missing_market);

    let match_link = match_link(&event);

    Ok(Some(NormalizedMatch {
        source: Source::Sofascore,
        home_team: team_name(&event.home_team.name)?,
        away_team: team_name(&event.away_team.name)?,
        home_score,
        away_score,
        league: event.tournament.category.name,
        tournament: event.tournament.name,
        match_link,
        market_open,
    }))
}

/// Review link, only when the tournament and season are both known.
fn match_link(event: &RawEvent) -> Option<String> {
    let tournament_id = event.tournament.id?;
    event.season.as_ref().and_then(|s| s.id)?;
    let slug = event.slug.as_deref()?;
    let custom_id = event.custom_id.as_deref()?;

    Some(format!(
        "{}/{}/{}#id:{}",
        SOFASCORE_BASE_URL, slug, custom_id, tournament_id
    ))
}

/// Live football feed from Sofascore.
#[derive(Debug, Clone)]
pub struct SofascoreFeed {
    http: reqwest::Client,
    url: String,
    options: AdapterOptions,
}

impl SofascoreFeed {
    /// Create a feed reading the given live-events endpoint.
    pub fn new(http: reqwest::Client, url: impl Into<String>, options: AdapterOptions) -> Self {
        Self {
            http,
            url: url.into(),
            options,
        }
    }
}

#[async_trait]
impl LiveFeed for SofascoreFeed {
    fn source(&self) -> Source {
        Source::Sofascore
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<NormalizedMatch>, FeedError> {
        let raw = get_json(Source::Sofascore, self.http.get(&self.url)).await?;
        let matches = normalize(&raw, &self.options);
        info!(count = matches.len(), "Total Sofascore live matches");
        Ok(matches)
    }
}
