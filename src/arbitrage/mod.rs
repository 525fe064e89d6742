//! Arbitrage module for correlating feeds and detecting score lag.
//!
//! This module handles:
//! - Pairing records from the two providers by team-name similarity
//! - Deciding which pairs show an exploitable score lead on an open market

pub mod correlator;
pub mod detector;

pub use correlator::{correlate, similar, teams_match, CorrelatedPair, CorrelationMode};
pub use detector::{
    detect, find_actionable, governing_market_open, is_actionable, score_advantage,
    DetectionPolicy, Discrepancy, Side, SuspensionAuthority,
};
