//! Core data models for the meetup schedule bot.
//!
//! This crate provides the fundamental data types shared by the store,
//! the Messenger layer and the webhook handlers:
//! - Talks and speakers as stored in the relational schema
//! - Per-user likes
//! - Parsed postback commands from Messenger buttons

pub mod command;
pub mod error;
pub mod talk;

pub use command::{is_talk_rate_command, PostbackCommand};
pub use error::{ModelError, Result};
pub use talk::{Like, Speaker, Talk, TalkWithSpeaker};
