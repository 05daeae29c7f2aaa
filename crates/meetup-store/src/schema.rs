//! Database schema definitions.

use rusqlite::Connection;

use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS speakers (
    facebook_id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS talks (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    speaker_facebook_id TEXT NOT NULL REFERENCES speakers(facebook_id)
);

CREATE INDEX IF NOT EXISTS idx_talks_speaker ON talks(speaker_facebook_id);

CREATE TABLE IF NOT EXISTS likes (
    user_facebook_id TEXT NOT NULL,
    talk_id INTEGER NOT NULL REFERENCES talks(id) ON DELETE CASCADE,
    PRIMARY KEY (user_facebook_id, talk_id)
);

CREATE INDEX IF NOT EXISTS idx_likes_talk ON likes(talk_id);
"#;

/// Creates all tables and indexes.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
