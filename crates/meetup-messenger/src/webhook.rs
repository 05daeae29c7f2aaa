//! Inbound webhook payload types.
//!
//! Only the fields the bot reads are modeled; everything else in the
//! platform's JSON is ignored. Identity fields are optional so that one
//! malformed event does not reject the whole delivery.

use serde::{Deserialize, Serialize};

/// Object type Messenger uses for page subscriptions.
pub const PAGE_OBJECT: &str = "page";

/// Top-level body of a webhook POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Subscription object, `"page"` for Messenger.
    pub object: String,
    /// Batched entries, one per page.
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    /// Returns true if this delivery is for a page subscription.
    pub fn is_page(&self) -> bool {
        self.object == PAGE_OBJECT
    }
}

/// One page's batch of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Page id.
    #[serde(default)]
    pub id: Option<String>,
    /// Delivery time in milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
    /// Messaging events, in order.
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// A user or page reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Page-scoped id.
    pub id: String,
}

/// A text message sent by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Message id.
    #[serde(default)]
    pub mid: Option<String>,
    /// Message text, absent for stickers and attachments.
    #[serde(default)]
    pub text: Option<String>,
    /// Set when the page itself sent the message.
    #[serde(default)]
    pub is_echo: bool,
}

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postback {
    /// Button title as shown to the user.
    #[serde(default)]
    pub title: Option<String>,
    /// Developer-defined payload, e.g. `"talk_rate 2"`.
    pub payload: String,
}

/// A single messaging event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Option<Participant>,
    #[serde(default)]
    pub recipient: Option<Participant>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<IncomingMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
}

impl MessagingEvent {
    /// Builds a postback event (handy in tests and tooling).
    pub fn postback(sender_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            sender: Some(Participant { id: sender_id.into() }),
            postback: Some(Postback {
                title: None,
                payload: payload.into(),
            }),
            ..Self::default()
        }
    }

    /// Builds a text message event.
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: Some(Participant { id: sender_id.into() }),
            message: Some(IncomingMessage {
                mid: None,
                text: Some(text.into()),
                is_echo: false,
            }),
            ..Self::default()
        }
    }

    /// Sender's page-scoped id.
    pub fn sender_id(&self) -> Option<&str> {
        self.sender.as_ref().map(|s| s.id.as_str())
    }

    /// Postback payload, if this event is a button press.
    pub fn postback_payload(&self) -> Option<&str> {
        self.postback.as_ref().map(|p| p.payload.as_str())
    }

    /// Message text, if this is a text message from a user.
    pub fn text_message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| !m.is_echo)
            .and_then(|m| m.text.as_deref())
    }
}
