//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

use crate::alert::TelegramConfig;
use crate::arbitrage::{CorrelationMode, DetectionPolicy, SuspensionAuthority};
use crate::feed::{AdapterOptions, MissingMarketPolicy};
use crate::pipeline::RunMode;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Telegram Credentials ===
    /// Bot token for the Telegram Bot API.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat that receives alerts.
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    // === Feeds ===
    /// Live events endpoint of the signal source (Sofascore).
    #[serde(default = "default_signal_feed_url")]
    pub signal_feed_url: String,

    /// Live/prematch events endpoint of the market source (Sportybet).
    #[serde(default = "default_market_feed_url")]
    pub market_feed_url: String,

    /// Sport identifier passed to the market source.
    #[serde(default = "default_market_sport_id")]
    pub market_sport_id: String,

    /// Per-request HTTP client timeout.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Upper bound on a whole feed fetch, enforced by the orchestrator.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    // === Detection Policy ===
    /// Which team names must be similar for two records to correlate.
    #[serde(default)]
    pub correlation_mode: CorrelationMode,

    /// Which record's market flag gates an alert.
    #[serde(default)]
    pub suspension_authority: SuspensionAuthority,

    /// Market state assumed when a record carries no market data.
    #[serde(default)]
    pub missing_market_policy: MissingMarketPolicy,

    // === Operation Modes ===
    /// Timer-driven polling or inbound push.
    #[serde(default)]
    pub run_mode: RunMode,

    /// Seconds between timer-driven cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose Prometheus metrics.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_signal_feed_url() -> String {
    "https://www.sofascore.com/api/v1/sport/football/events/live".to_string()
}

fn default_market_feed_url() -> String {
    "https://www.sportybet.com/api/ng/factsCenter/configurableLiveOrPrematchEvents".to_string()
}

fn default_market_sport_id() -> String {
    "sr:sport:1".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_poll_interval() -> u64 {
    180 // 3 minutes
}

fn default_port() -> u16 {
    3001
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            telegram_api_url: default_telegram_api_url(),
            signal_feed_url: default_signal_feed_url(),
            market_feed_url: default_market_feed_url(),
            market_sport_id: default_market_sport_id(),
            http_timeout_ms: default_http_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            correlation_mode: CorrelationMode::default(),
            suspension_authority: SuspensionAuthority::default(),
            missing_market_policy: MissingMarketPolicy::default(),
            run_mode: RunMode::default(),
            poll_interval_secs: default_poll_interval(),
            port: default_port(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            log_json: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Build configuration from explicit `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        check_http_url("SIGNAL_FEED_URL", &self.signal_feed_url)?;
        check_http_url("MARKET_FEED_URL", &self.market_feed_url)?;
        check_http_url("TELEGRAM_API_URL", &self.telegram_api_url)?;

        if self.market_sport_id.trim().is_empty() {
            return Err("MARKET_SPORT_ID must not be empty".to_string());
        }

        if self.poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be greater than 0".to_string());
        }

        if self.fetch_timeout_ms == 0 || self.http_timeout_ms == 0 {
            return Err("FETCH_TIMEOUT_MS and HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Whether both bot credentials are present.
    pub fn has_notifier_credentials(&self) -> bool {
        self.telegram().credentials().is_some()
    }

    /// Telegram settings handed to the notifier.
    pub fn telegram(&self) -> TelegramConfig {
        TelegramConfig {
            api_url: self.telegram_api_url.clone(),
            bot_token: self.bot_token.clone(),
            chat_id: self.chat_id.clone(),
        }
    }

    /// Options shared by both provider adapters.
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            missing_market: self.missing_market_policy,
        }
    }

    /// Correlation and suspension policy for the detector.
    pub fn detection_policy(&self) -> DetectionPolicy {
        DetectionPolicy {
            correlation: self.correlation_mode,
            authority: self.suspension_authority,
        }
    }
}

fn check_http_url(name: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", name, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{} must use http or https, got {}", name, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.poll_interval_secs, 180);
        assert_eq!(config.port, 3001);
        assert_eq!(config.correlation_mode, CorrelationMode::HomeAndAway);
        assert_eq!(config.suspension_authority, SuspensionAuthority::Market);
        assert_eq!(config.missing_market_policy, MissingMarketPolicy::Closed);
        assert_eq!(config.run_mode, RunMode::Poll);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_feed_url() {
        let config = Config {
            market_feed_url: "ftp://example.com/events".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn credentials_require_token_and_chat() {
        let mut config = Config {
            bot_token: Some("123:abc".to_string()),
            ..Config::default()
        };
        assert!(!config.has_notifier_credentials());

        config.chat_id = Some("42".to_string());
        assert!(config.has_notifier_credentials());
    }

    #[test]
    fn policy_enums_parse_from_env_strings() {
        let vars = vec![
            ("CORRELATION_MODE".to_string(), "home_only".to_string()),
            ("SUSPENSION_AUTHORITY".to_string(), "signal".to_string()),
            ("MISSING_MARKET_POLICY".to_string(), "open".to_string()),
            ("RUN_MODE".to_string(), "push".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.correlation_mode, CorrelationMode::HomeOnly);
        assert_eq!(config.suspension_authority, SuspensionAuthority::Signal);
        assert_eq!(config.missing_market_policy, MissingMarketPolicy::Open);
        assert_eq!(config.run_mode, RunMode::Push);
    }
}
