//! Alert module: message formatting and delivery.
//!
//! This module handles:
//! - Turning actionable pairs into chat messages
//! - The notifier seam and the Telegram transport
//! - Batch delivery with per-message results
//! - Recording notifier for testing

pub mod dispatcher;
pub mod message;
pub mod mock;
pub mod telegram;

pub use dispatcher::{Delivery, DispatchReport, Dispatcher, Notifier};
pub use message::{Alert, NO_LINK_PLACEHOLDER};
pub use mock::RecordingNotifier;
pub use telegram::{TelegramConfig, TelegramNotifier};
