//! Shared state for the webhook handlers.

use std::sync::Arc;

use meetup_messenger::MessageSender;
use meetup_store::Database;

use crate::config::BotConfig;

/// State shared across all requests.
#[derive(Clone)]
pub struct BotState {
    /// Server configuration.
    pub config: Arc<BotConfig>,
    /// Talk and like storage.
    pub db: Arc<Database>,
    /// Outgoing message channel.
    pub sender: Arc<dyn MessageSender>,
}

impl BotState {
    /// Creates a new state from its parts.
    pub fn new(config: BotConfig, db: Database, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            sender,
        }
    }
}
