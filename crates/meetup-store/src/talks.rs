//! Talk and speaker queries.

use meetup_models::{Speaker, Talk, TalkWithSpeaker};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::Database;
use crate::error::Result;

const SELECT_TALKS: &str = "SELECT t.id, t.title, t.description, t.speaker_facebook_id, s.name \
     FROM talks t JOIN speakers s ON s.facebook_id = t.speaker_facebook_id";

fn row_to_talk(row: &Row<'_>) -> rusqlite::Result<TalkWithSpeaker> {
    Ok(TalkWithSpeaker {
        talk: Talk {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            speaker_facebook_id: row.get(3)?,
        },
        speaker_name: row.get(4)?,
    })
}

impl Database {
    /// Inserts or renames a speaker.
    pub fn insert_speaker(&self, speaker: &Speaker) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO speakers (facebook_id, name) VALUES (?1, ?2)
                 ON CONFLICT(facebook_id) DO UPDATE SET name = excluded.name",
                params![speaker.facebook_id, speaker.name],
            )?;
            Ok(())
        })
    }

    /// Inserts a talk. The speaker must already exist.
    pub fn insert_talk(&self, talk: &Talk) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO talks (id, title, description, speaker_facebook_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![talk.id, talk.title, talk.description, talk.speaker_facebook_id],
            )?;
            debug!(talk_id = talk.id, "inserted talk");
            Ok(())
        })
    }

    /// Looks up a single talk by id.
    pub fn get_talk(&self, id: i64) -> Result<Option<TalkWithSpeaker>> {
        self.with_connection(|conn| {
            let sql = format!("{} WHERE t.id = ?1", SELECT_TALKS);
            let talk = conn.query_row(&sql, params![id], row_to_talk).optional()?;
            Ok(talk)
        })
    }

    /// Lists every talk, ordered by id.
    ///
    /// The order defines schedule positions: position `n` is element `n - 1`.
    pub fn list_talks(&self) -> Result<Vec<TalkWithSpeaker>> {
        self.with_connection(|conn| {
            let sql = format!("{} ORDER BY t.id", SELECT_TALKS);
            let mut stmt = conn.prepare(&sql)?;
            let talks = stmt
                .query_map([], row_to_talk)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(talks)
        })
    }

    /// Deletes all likes, talks and speakers.
    pub fn clear(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch("DELETE FROM likes; DELETE FROM talks; DELETE FROM speakers;")?;
            Ok(())
        })
    }
}
