//! Talk, speaker and like types.
//!
//! These mirror the rows of the relational store one-to-one. The only
//! derived shape is [`TalkWithSpeaker`], which is what the schedule and
//! talk-info messages render.

use serde::{Deserialize, Serialize};

/// A meetup speaker, keyed by their Facebook user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Facebook page-scoped user id of the speaker.
    pub facebook_id: String,
    /// Display name.
    pub name: String,
}

impl Speaker {
    /// Creates a new speaker.
    pub fn new(facebook_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            facebook_id: facebook_id.into(),
            name: name.into(),
        }
    }
}

/// A scheduled presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    /// Primary key.
    pub id: i64,
    /// Talk title.
    pub title: String,
    /// Optional long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Facebook id of the speaker giving the talk.
    pub speaker_facebook_id: String,
}

impl Talk {
    /// Creates a new talk without a description.
    pub fn new(id: i64, title: impl Into<String>, speaker_facebook_id: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            speaker_facebook_id: speaker_facebook_id.into(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A talk joined with its speaker's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkWithSpeaker {
    /// The talk row.
    #[serde(flatten)]
    pub talk: Talk,
    /// Name of the speaker.
    pub speaker_name: String,
}

impl TalkWithSpeaker {
    /// Talk id shortcut.
    pub fn id(&self) -> i64 {
        self.talk.id
    }

    /// Talk title shortcut.
    pub fn title(&self) -> &str {
        &self.talk.title
    }
}

/// A user's like of a talk. At most one exists per (user, talk).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Like {
    /// Facebook id of the user who liked the talk.
    pub user_facebook_id: String,
    /// Liked talk.
    pub talk_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_talk_builder() {
        let talk = Talk::new(3, "Ownership in practice", "100").with_description("Borrowck");
        assert_eq!(talk.id, 3);
        assert_eq!(talk.description.as_deref(), Some("Borrowck"));
    }

    #[test]
    fn test_talk_with_speaker_serializes_flat() {
        let talk = TalkWithSpeaker {
            talk: Talk::new(1, "Intro", "42"),
            speaker_name: "Ada".to_string(),
        };
        let json = serde_json::to_value(&talk).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Intro");
        assert_eq!(json["speaker_name"], "Ada");
        assert!(json.get("description").is_none());
    }
}
