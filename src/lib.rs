//! Live football score-lag alert bot.
//!
//! Sofascore usually reports a goal before Sportybet suspends or reprices its
//! market. This library watches both providers, pairs up the same fixture,
//! and sends a Telegram alert when the signal score is ahead while the
//! bookmaker's market is still open.
//!
//! # Pipeline
//!
//! ```text
//! Sofascore ─┐
//!            ├─ normalize ─ correlate ─ detect ─ dispatch ─ Telegram
//! Sportybet ─┘
//! ```
//!
//! Cycles are driven either by a timer (poll mode) or by a snapshot pushed to
//! `POST /api/setevents` (push mode).
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`feed`]: Provider adapters and market status
//! - [`arbitrage`]: Match correlation and discrepancy detection
//! - [`alert`]: Message formatting and delivery
//! - [`pipeline`]: Cycle orchestration
//! - [`api`]: HTTP API for push, health and status
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod alert;
pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod pipeline;
pub mod utils;

pub use config::Config;
pub use error::{BotError, Result};
pub use pipeline::{CycleReport, Orchestrator, RunMode, Trigger};
