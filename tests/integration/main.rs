//! End-to-end tests for the score-lag pipeline.
//!
//! A local axum server stands in for Sofascore, Sportybet and the Telegram
//! Bot API, so the real adapters and notifier run over HTTP.
//!
//! The `live_` tests hit the real providers.
//! Run with: cargo test --test integration -- --ignored

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use livescore_arb::config::Config;
use livescore_arb::feed::{build_http_client, LiveFeed, SofascoreFeed, Source, SportybetFeed};
use livescore_arb::pipeline::{Orchestrator, Trigger};

/// Requests seen by the fake providers.
#[derive(Debug, Clone, Default)]
struct Recorded {
    market_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    messages: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

#[derive(Clone)]
struct FakeState {
    signal: Arc<Value>,
    market: Arc<Value>,
    telegram_status: StatusCode,
    recorded: Recorded,
}

fn sofascore_event(home: &str, away: &str, hs: u32, aws: u32, category: &str) -> Value {
    json!({
        "homeTeam": { "name": home },
        "awayTeam": { "name": away },
        "homeScore": { "current": hs },
        "awayScore": { "current": aws },
        "tournament": { "name": "Premier League", "id": 17, "category": { "name": category } },
        "season": { "id": 52186 },
        "slug": "arsenal-chelsea",
        "customId": "Rsab",
    })
}

fn sportybet_event(
    home: &str,
    away: &str,
    score: &str,
    home_active: i64,
    away_active: i64,
) -> Value {
    json!({
        "homeTeamName": home,
        "awayTeamName": away,
        "setScore": score,
        "markets": [{
            "outcomes": [
                { "desc": "Home", "isActive": home_active },
                { "desc": "Draw", "isActive": 1 },
                { "desc": "Away", "isActive": away_active },
            ]
        }]
    })
}

fn signal_fixture() -> Value {
    json!({
        "events": [
            sofascore_event("Arsenal", "Chelsea", 2, 0, "England"),
            sofascore_event("Lyon", "Nice", 0, 1, "France"),
            sofascore_event("Arsenal SRL", "Chelsea SRL", 5, 0, "Simulated Reality League"),
            { "homeTeam": { "name": "broken" } },
        ]
    })
}

fn market_fixture() -> Value {
    json!({
        "data": [
            {
                "categoryName": "England",
                "name": "Premier League",
                "events": [sportybet_event("Arsenal FC", "Chelsea FC", "1:0", 1, 1)]
            },
            {
                "categoryName": "France",
                "name": "Ligue 1",
                "events": [
                    sportybet_event("Olympique Lyon", "OGC Nice", "0:0", 0, 0),
                    { "homeTeamName": "Bad", "awayTeamName": "Score", "setScore": "1-0" },
                ]
            },
            {
                "categoryName": "Simulated Reality League",
                "name": "Premier League SRL",
                "events": [sportybet_event("Arsenal SRL", "Chelsea SRL", "0:0", 1, 1)]
            }
        ]
    })
}

async fn live_events(State(state): State<FakeState>) -> Json<Value> {
    Json((*state.signal).clone())
}

async fn market_events(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.recorded.market_queries.lock().unwrap().push(query);
    Json((*state.market).clone())
}

async fn send_message(
    State(state): State<FakeState>,
    Path(bot): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.recorded.messages.lock().unwrap().push((bot, query));
    let ok = state.telegram_status.is_success();
    (state.telegram_status, Json(json!({ "ok": ok })))
}

/// Start the fake providers and return their base URL.
async fn spawn_providers(state: FakeState) -> String {
    let router = Router::new()
        .route("/api/v1/sport/football/events/live", get(live_events))
        .route("/api/ng/factsCenter/configurableLiveOrPrematchEvents", get(market_events))
        .route("/:bot/sendMessage", get(send_message))
        .with_state(state);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

fn config_for(base: &str) -> Config {
    Config {
        bot_token: Some("123:abc".to_string()),
        chat_id: Some("-1001".to_string()),
        telegram_api_url: base.to_string(),
        signal_feed_url: format!("{}/api/v1/sport/football/events/live", base),
        market_feed_url: format!("{}/api/ng/factsCenter/configurableLiveOrPrematchEvents", base),
        http_timeout_ms: 2_000,
        fetch_timeout_ms: 3_000,
        ..Config::default()
    }
}

fn fake_state(telegram_status: StatusCode) -> FakeState {
    FakeState {
        signal: Arc::new(signal_fixture()),
        market: Arc::new(market_fixture()),
        telegram_status,
        recorded: Recorded::default(),
    }
}

#[tokio::test]
async fn poll_cycle_alerts_on_open_market_lead() {
    let state = fake_state(StatusCode::OK);
    let recorded = state.recorded.clone();
    let base = spawn_providers(state).await;

    let config = config_for(&base);
    config.validate().unwrap();
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let report = orchestrator.run_cycle(Trigger::Manual).await;

    // Virtual league and malformed entries never reach correlation.
    assert_eq!(report.signal_matches, 2);
    assert_eq!(report.market_matches, 2);
    assert!(report.failed_feeds.is_empty());

    // Arsenal is open and behind; Lyon is behind but suspended.
    assert_eq!(report.correlated, 2);
    assert_eq!(report.actionable(), 1);
    assert_eq!(report.dispatch.sent, 1);

    let messages = recorded.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    let (bot, query) = &messages[0];
    assert_eq!(bot, "bot123:abc");
    assert_eq!(query["chat_id"], "-1001");
    assert_eq!(
        query["text"],
        "GAME: Premier League\n\
         TEAMS: Arsenal vs Chelsea\n\
         Sofascore: 2 - 0\n\
         REVIEW: https://www.sofascore.com/arsenal-chelsea/Rsab#id:17"
    );

    let queries = recorded.market_queries.lock().unwrap().clone();
    assert_eq!(queries[0]["sportId"], "sr:sport:1");
    assert!(queries[0]["_t"].parse::<i64>().is_ok());
}

#[tokio::test]
async fn rejected_message_is_reported_not_raised() {
    let state = fake_state(StatusCode::BAD_REQUEST);
    let base = spawn_providers(state).await;

    let orchestrator = Orchestrator::from_config(&config_for(&base)).unwrap();
    let report = orchestrator.run_cycle(Trigger::Manual).await;

    assert_eq!(report.actionable(), 1);
    assert_eq!(report.dispatch.sent, 0);
    assert_eq!(report.dispatch.failed, 1);
    assert_eq!(orchestrator.stats().await.notifications_failed, 1);
}

#[tokio::test]
async fn missing_credentials_skip_delivery() {
    let state = fake_state(StatusCode::OK);
    let recorded = state.recorded.clone();
    let base = spawn_providers(state).await;

    let config = Config {
        chat_id: None,
        ..config_for(&base)
    };
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    let report = orchestrator.run_cycle(Trigger::Manual).await;

    assert_eq!(report.actionable(), 1);
    assert_eq!(report.dispatch.skipped, 1);
    assert_eq!(report.dispatch.failed, 0);
    assert!(recorded.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_market_degrades_cycle() {
    let state = fake_state(StatusCode::OK);
    let base = spawn_providers(state).await;

    let config = Config {
        market_feed_url: format!("{}/not-here", base),
        ..config_for(&base)
    };
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    let report = orchestrator.run_cycle(Trigger::Timer).await;

    assert_eq!(report.failed_feeds, vec![Source::Sportybet]);
    assert_eq!(report.signal_matches, 2);
    assert_eq!(report.correlated, 0);
    assert_eq!(report.dispatch.sent, 0);
}

#[tokio::test]
async fn signal_authority_reads_the_signal_flag() {
    let state = fake_state(StatusCode::OK);
    let base = spawn_providers(state).await;

    // The Sofascore fixture carries no market data; under the `closed`
    // missing-market policy the signal side is never open.
    let config = Config {
        suspension_authority: livescore_arb::arbitrage::SuspensionAuthority::Signal,
        ..config_for(&base)
    };
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    let report = orchestrator.run_cycle(Trigger::Manual).await;

    assert_eq!(report.correlated, 2);
    assert_eq!(report.actionable(), 0);
}

/// Fetch the real Sofascore live feed.
#[tokio::test]
#[ignore = "hits the live Sofascore API"]
async fn live_sofascore_snapshot() {
    let config = Config::default();
    let http = build_http_client(&config).unwrap();
    let feed = SofascoreFeed::new(http, &config.signal_feed_url, config.adapter_options());

    match feed.fetch().await {
        Ok(matches) => println!("Sofascore live matches: {}", matches.len()),
        Err(e) => println!("Sofascore fetch failed: {}", e),
    }
}

/// Fetch the real Sportybet live feed.
#[tokio::test]
#[ignore = "hits the live Sportybet API"]
async fn live_sportybet_snapshot() {
    let config = Config::default();
    let http = build_http_client(&config).unwrap();
    let feed = SportybetFeed::new(
        http,
        &config.market_feed_url,
        &config.market_sport_id,
        config.adapter_options(),
    );

    match feed.fetch().await {
        Ok(matches) => println!("Sportybet live matches: {}", matches.len()),
        Err(e) => println!("Sportybet fetch failed: {}", e),
    }
}
