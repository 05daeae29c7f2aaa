//! Persistence layer for the meetup schedule bot.
//!
//! Talks, speakers and likes live in a single SQLite database accessed
//! through [`Database`]. The connection is guarded by a mutex so the
//! database can be shared between request handlers.
//!
//! # Example
//!
//! ```no_run
//! use meetup_store::Database;
//!
//! let db = Database::open("/var/lib/meetup-facebook-bot/bot.db").unwrap();
//! db.initialize().unwrap();
//!
//! for talk in db.list_talks().unwrap() {
//!     println!("{} by {}", talk.title(), talk.speaker_name);
//! }
//! ```

pub mod database;
pub mod error;
pub mod likes;
pub mod schema;
pub mod seed;
pub mod talks;

pub use database::{path_from_url, Database};
pub use error::{Result, StoreError};
