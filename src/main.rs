//! Live football score-lag alert bot entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use livescore_arb::api::{create_router, AppState};
use livescore_arb::config::Config;
use livescore_arb::feed::{
    build_http_client, LiveFeed, NormalizedMatch, SofascoreFeed, SportybetFeed,
};
use livescore_arb::metrics;
use livescore_arb::pipeline::{Orchestrator, RunMode, Trigger};
use livescore_arb::utils::shutdown_signal;

/// Records printed per feed by `snapshot`.
const SNAPSHOT_PREVIEW: usize = 5;

/// Live football score-lag alert bot.
#[derive(Parser, Debug)]
#[command(name = "livescore-arb")]
#[command(about = "Alerts when Sofascore scores lead an open Sportybet market")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true, env = "VERBOSE")]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the API and run cycles (default).
    Run {
        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,

        /// Timer-driven polling or inbound push.
        #[arg(short, long, value_enum)]
        mode: Option<RunMode>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch both feeds once and print what was normalized.
    Snapshot,

    /// Run one cycle and print the report.
    Scan {
        /// Deliver alerts instead of only printing them.
        #[arg(long)]
        notify: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up .env before clap reads env-backed flags
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("livescore_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Snapshot) => cmd_snapshot().await,
        Some(Command::Scan { notify }) => cmd_scan(notify).await,
        Some(Command::Run { port, mode }) => cmd_run(port, mode).await,
        None => cmd_run(None, None).await,
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("LIVESCORE ARB - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Check notifier credentials
    print!("Checking Telegram credentials... ");
    match (&config.bot_token, &config.chat_id) {
        (Some(_), Some(_)) if config.has_notifier_credentials() => println!("OK"),
        (None, None) => println!("MISSING (alerts will be skipped)"),
        _ => println!("INCOMPLETE (BOT_TOKEN and CHAT_ID are both required)"),
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Signal Feed: {}", config.signal_feed_url);
    println!("  Market Feed: {} (sportId={})", config.market_feed_url, config.market_sport_id);
    println!("  Run Mode: {}", config.run_mode);
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Fetch Timeout: {}ms", config.fetch_timeout_ms);
    println!("  Correlation: {}", config.correlation_mode);
    println!("  Suspension Authority: {}", config.suspension_authority);
    println!("  Missing Market: {}", config.missing_market_policy);
    println!("  Port: {}", config.port);
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch both feeds once and print the normalized records.
async fn cmd_snapshot() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("LIVESCORE ARB - FEED SNAPSHOT");
    println!("======================================================================");

    let config = load_config()?;
    let http = build_http_client(&config)?;
    let options = config.adapter_options();

    let signal = SofascoreFeed::new(http.clone(), &config.signal_feed_url, options);
    let market = SportybetFeed::new(
        http,
        &config.market_feed_url,
        &config.market_sport_id,
        options,
    );

    let (signal_result, market_result) = tokio::join!(signal.fetch(), market.fetch());

    print_snapshot(&signal, signal_result.map_err(anyhow::Error::from));
    print_snapshot(&market, market_result.map_err(anyhow::Error::from));

    println!("======================================================================");
    Ok(())
}

fn print_snapshot(feed: &dyn LiveFeed, result: anyhow::Result<Vec<NormalizedMatch>>) {
    println!("----------------------------------------------------------------------");
    match result {
        Ok(matches) => {
            println!("{}: {} live matches", feed.source(), matches.len());
            for m in matches.iter().take(SNAPSHOT_PREVIEW) {
                println!(
                    "  [{}] {} {} (market {})",
                    m.tournament,
                    m.fixture(),
                    m.score_line(),
                    if m.market_open { "open" } else { "closed" }
                );
            }
            if matches.len() > SNAPSHOT_PREVIEW {
                println!("  ... {} more", matches.len() - SNAPSHOT_PREVIEW);
            }
        }
        Err(e) => println!("{}: FAILED ({})", feed.source(), e),
    }
}

/// Run one cycle and print the report.
async fn cmd_scan(notify: bool) -> anyhow::Result<()> {
    println!("======================================================================");
    println!(
        "LIVESCORE ARB - SCAN{}",
        if notify { "" } else { " (DRY RUN)" }
    );
    println!("======================================================================");

    let config = load_config()?;
    let orchestrator = Orchestrator::from_config(&config)?.with_notifications(notify);

    let report = orchestrator.run_cycle(Trigger::Manual).await;

    println!("Signal matches: {}", report.signal_matches);
    println!("Market matches: {}", report.market_matches);
    println!("Correlated: {}", report.correlated);
    println!("Actionable: {}", report.actionable());
    for feed in &report.failed_feeds {
        println!("  WARNING: {} fetch failed", feed);
    }
    for alert in &report.alerts {
        println!("----------------------------------------------------------------------");
        println!("{}", alert.text());
    }
    if notify {
        println!("----------------------------------------------------------------------");
        println!(
            "Sent: {}  Skipped: {}  Failed: {}",
            report.dispatch.sent, report.dispatch.skipped, report.dispatch.failed
        );
    }
    println!("======================================================================");

    Ok(())
}

/// Serve the API and, in poll mode, run the interval loop.
async fn cmd_run(port_override: Option<u16>, mode_override: Option<RunMode>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = load_config()?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }
    if let Some(mode) = mode_override {
        config.run_mode = mode;
    }

    info!("Configuration loaded successfully");
    info!("Mode: {}", config.run_mode);
    info!("Correlation: {}", config.correlation_mode);
    info!("Suspension authority: {}", config.suspension_authority);
    if !config.has_notifier_credentials() {
        warn!("BOT_TOKEN or CHAT_ID not set, alerts will be logged but not sent");
    }

    if config.metrics_enabled {
        metrics::install_exporter(config.metrics_port)?;
        info!("Prometheus exporter listening on port {}", config.metrics_port);
    }

    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);

    // Create app state
    let app_state = AppState::new(orchestrator.clone(), config.adapter_options(), config.run_mode);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);

    // Spawn poll loop
    let poller = match config.run_mode {
        RunMode::Poll => {
            let interval = Duration::from_secs(config.poll_interval_secs);
            Some(tokio::spawn(
                orchestrator.run_forever(interval, shutdown_signal()),
            ))
        }
        RunMode::Push => {
            info!("Waiting for snapshots on POST /api/setevents");
            None
        }
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = poller {
        if let Err(e) = handle.await {
            error!("Poll loop ended abnormally: {}", e);
        }
    }

    info!("Shutdown complete");
    Ok(())
}
