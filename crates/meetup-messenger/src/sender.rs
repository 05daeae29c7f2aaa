//! The seam between handlers and the Send API.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::OutgoingMessage;

/// Delivers messages to a Messenger user.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends one message to the user with the given page-scoped id.
    async fn send(&self, recipient_id: &str, message: &OutgoingMessage) -> Result<()>;
}

/// Sender that keeps every message in memory instead of delivering it.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: std::sync::Mutex<Vec<(String, OutgoingMessage)>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All (recipient, message) pairs sent so far.
    pub fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages sent to one recipient.
    pub fn sent_to(&self, recipient_id: &str) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == recipient_id)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sent().is_empty()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, recipient_id: &str, message: &OutgoingMessage) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((recipient_id.to_string(), message.clone()));
        }
        Ok(())
    }
}
