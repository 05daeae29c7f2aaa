//! Facebook Messenger integration for the meetup schedule bot.
//!
//! This crate covers both directions of the Messenger platform:
//! - Inbound: typed webhook payloads ([`WebhookPayload`], [`MessagingEvent`])
//! - Outbound: the Send API client ([`GraphClient`]) behind the
//!   [`MessageSender`] trait
//! - Message builders for the schedule carousel and talk details
//!
//! # Example
//!
//! ```no_run
//! use meetup_messenger::{GraphClient, MessageSender, OutgoingMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GraphClient::new("page-access-token")?;
//!     client.send("1234567890", &OutgoingMessage::text("Hello!")).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod message;
pub mod schedule;
pub mod sender;
pub mod webhook;

pub use client::{GraphClient, DEFAULT_GRAPH_URL};
pub use error::{MessengerError, Result};
pub use message::{Attachment, Button, Element, OutgoingMessage, Template};
pub use schedule::{schedule_messages, talk_info_message, ScheduleEntry};
pub use sender::MessageSender;
#[cfg(any(test, feature = "testing"))]
pub use sender::RecordingSender;
pub use webhook::{Entry, IncomingMessage, MessagingEvent, Participant, Postback, WebhookPayload};
