//! Messenger webhook server for the meetup schedule bot.
//!
//! The server receives webhook deliveries from Facebook Messenger,
//! routes each messaging event to a command handler and replies through
//! the Send API.
//!
//! # Environment Variables
//!
//! Required:
//! - `ACCESS_TOKEN`: Page access token used for the Send API
//! - `VERIFY_TOKEN`: Token Messenger echoes during webhook verification
//! - `DATABASE_URL`: `sqlite://<path>` or a plain path to the database
//!
//! Optional:
//! - `PAGE_ID`: Only handle entries addressed to this page
//! - `BOT_HOST` / `BOT_PORT`: Bind address (default: 127.0.0.1:8000)
//! - `GRAPH_API_URL`: Override the Graph API base URL
//!
//! # Postback Commands
//!
//! - `talk_info <id>` - Details of one talk
//! - `talk_rate <position>` - Toggle a like, then re-send the schedule
//! - `talk_ask <id>` - Currently answers with the schedule
//! - `like_confirm <id>` - Not implemented
//! - anything else, or plain text - The schedule

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::BotConfig;
pub use error::{ApiError, BotError, Result};
pub use handlers::dispatch;
pub use router::{create_router, serve};
pub use state::BotState;
