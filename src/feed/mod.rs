//! Live feed module for the two football data providers.
//!
//! This module handles:
//! - Normalized match records shared by both providers
//! - Provider adapters (Sofascore signal feed, Sportybet market feed)
//! - Market open/suspended evaluation
//! - Mock feed for testing

pub mod client;
pub mod mock;
pub mod sofascore;
pub mod sportybet;
pub mod status;
pub mod types;

pub use client::{build_http_client, LiveFeed};
pub use mock::{MatchBuilder, MockFeed, MockFeedConfig};
pub use sofascore::SofascoreFeed;
pub use sportybet::{parse_score, SportybetFeed};
pub use status::{is_open, market_open, MissingMarketPolicy};
pub use types::{
    is_virtual_league, AdapterOptions, MarketOutcome, NormalizedMatch, RawMarket, Source,
    VIRTUAL_LEAGUE_MARKER,
};
