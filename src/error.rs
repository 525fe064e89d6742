//! Unified error types for the score-lag alert bot.

use thiserror::Error;

use crate::feed::Source;

/// Unified error type for the bot.
///
/// Raised only while starting up; a running cycle degrades instead.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// HTTP client could not be built.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors fetching a live snapshot from one provider.
///
/// The orchestrator never propagates these: a failed source is treated as an
/// empty snapshot for the cycle.
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("{feed} request failed: {error}")]
    Http {
        /// Provider that failed.
        feed: Source,
        /// Underlying transport error.
        #[source]
        error: reqwest::Error,
    },

    /// Provider answered with a non-success status.
    #[error("{feed} returned HTTP {status}")]
    Status {
        /// Provider that failed.
        feed: Source,
        /// HTTP status code.
        status: u16,
    },

    /// Fetch did not complete in time.
    #[error("{feed} fetch timed out after {timeout_ms}ms")]
    Timeout {
        /// Provider that timed out.
        feed: Source,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Response body was not JSON at all.
    #[error("failed to parse {feed} payload: {reason}")]
    Parse {
        /// Provider that failed.
        feed: Source,
        /// Reason for failure.
        reason: String,
    },
}

impl FeedError {
    /// Provider the error belongs to.
    pub fn feed(&self) -> Source {
        match self {
            FeedError::Http { feed, .. }
            | FeedError::Status { feed, .. }
            | FeedError::Timeout { feed, .. }
            | FeedError::Parse { feed, .. } => *feed,
        }
    }
}

/// Per-record normalization failures. The record is dropped, the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Entry did not have the expected shape.
    #[error("malformed entry: {0}")]
    Malformed(String),

    /// Score string was not `H:A` with two non-negative integers.
    #[error("malformed score {0:?}")]
    MalformedScore(String),

    /// Team name was empty.
    #[error("empty team name")]
    EmptyTeamName,
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bot token or chat id is missing; nothing was sent.
    #[error("notifier is not configured: BOT_TOKEN and CHAT_ID are required")]
    NotConfigured,

    /// Messaging API rejected the message.
    #[error("message rejected: HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_error_reports_its_source() {
        let err = FeedError::Timeout {
            feed: Source::Sportybet,
            timeout_ms: 1500,
        };
        assert_eq!(err.feed(), Source::Sportybet);
        assert_eq!(err.to_string(), "Sportybet fetch timed out after 1500ms");
    }

    #[test]
    fn bad_config_value_is_a_config_error() {
        let err = crate::Config::from_vars(vec![(
            "POLL_INTERVAL_SECS".to_string(),
            "soon".to_string(),
        )])
        .unwrap_err();

        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn malformed_score_message_quotes_input() {
        let err = NormalizeError::MalformedScore("12".to_string());
        assert_eq!(err.to_string(), "malformed score \"12\"");
    }
}
