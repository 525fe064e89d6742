//! Recording notifier for unit testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::dispatcher::Notifier;
use crate::error::NotifyError;

/// Notifier that records messages instead of sending them.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    configured: bool,
    fail_on: Option<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Configured notifier that accepts every message.
    pub fn new() -> Self {
        Self {
            configured: true,
            fail_on: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Notifier without credentials.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Notifier that rejects any message containing `needle`.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new()
        }
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                return Err(NotifyError::Rejected {
                    status: 400,
                    body: "Bad Request: mock rejection".to_string(),
                });
            }
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
