//! Example schedule installed by the deployment tool.

use meetup_models::{Speaker, Talk};
use tracing::info;

use crate::database::Database;
use crate::error::Result;

/// (facebook_id, name)
const EXAMPLE_SPEAKERS: &[(&str, &str)] = &[
    ("1000000000000001", "Alice Example"),
    ("1000000000000002", "Bob Example"),
    ("1000000000000003", "Carol Example"),
];

/// (id, title, description, speaker facebook_id)
const EXAMPLE_TALKS: &[(i64, &str, &str, &str)] = &[
    (
        1,
        "Opening words",
        "Welcome, agenda and a few words about the community.",
        "1000000000000001",
    ),
    (
        2,
        "Writing a chatbot in an afternoon",
        "From a webhook to a working schedule bot, step by step.",
        "1000000000000002",
    ),
    (
        3,
        "Deploying small services",
        "nginx, systemd and certificates without a platform team.",
        "1000000000000003",
    ),
    (
        4,
        "Lightning talks",
        "Five minutes each, sign up at the registration desk.",
        "1000000000000001",
    ),
];

impl Database {
    /// Replaces the contents of the database with the example schedule.
    pub fn seed_example_data(&self) -> Result<usize> {
        self.initialize()?;
        self.clear()?;

        for (facebook_id, name) in EXAMPLE_SPEAKERS {
            self.insert_speaker(&Speaker::new(*facebook_id, *name))?;
        }
        for (id, title, description, speaker) in EXAMPLE_TALKS {
            self.insert_talk(&Talk::new(*id, *title, *speaker).with_description(*description))?;
        }

        info!(talks = EXAMPLE_TALKS.len(), "example schedule installed");
        Ok(EXAMPLE_TALKS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_replaces_existing_data() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_speaker(&Speaker::new("x", "Someone")).unwrap();
        db.insert_talk(&Talk::new(99, "Old talk", "x")).unwrap();
        db.set_like(99, "user-1").unwrap();

        let count = db.seed_example_data().unwrap();

        let talks = db.list_talks().unwrap();
        assert_eq!(talks.len(), count);
        assert!(talks.iter().all(|t| t.id() != 99));
        assert!(db.liked_talk_ids("user-1").unwrap().is_empty());
    }

    #[test]
    fn test_seed_twice() {
        let db = Database::in_memory().unwrap();
        db.seed_example_data().unwrap();
        db.seed_example_data().unwrap();
        assert_eq!(db.list_talks().unwrap().len(), EXAMPLE_TALKS.len());
    }
}
