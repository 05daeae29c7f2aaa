//! Per-user like queries.

use std::collections::{HashMap, HashSet};

use meetup_models::Like;
use rusqlite::params;
use tracing::debug;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Returns true if `user` has liked the talk.
    pub fn is_liked_by(&self, talk_id: i64, user: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM likes WHERE talk_id = ?1 AND user_facebook_id = ?2)",
                params![talk_id, user],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    /// Records a like. Liking twice is a no-op.
    pub fn set_like(&self, talk_id: i64, user: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO likes (user_facebook_id, talk_id) VALUES (?1, ?2)",
                params![user, talk_id],
            )?;
            Ok(())
        })
    }

    /// Removes a like if present.
    pub fn unset_like(&self, talk_id: i64, user: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM likes WHERE user_facebook_id = ?1 AND talk_id = ?2",
                params![user, talk_id],
            )?;
            Ok(())
        })
    }

    /// Toggles the like and returns whether the talk is now liked.
    pub fn revert_like(&self, talk_id: i64, user: &str) -> Result<bool> {
        let liked = self.with_transaction(|tx| {
            let removed = tx.execute(
                "DELETE FROM likes WHERE user_facebook_id = ?1 AND talk_id = ?2",
                params![user, talk_id],
            )?;
            if removed > 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO likes (user_facebook_id, talk_id) VALUES (?1, ?2)",
                params![user, talk_id],
            )?;
            Ok(true)
        })?;
        debug!(talk_id, user, liked, "like toggled");
        Ok(liked)
    }

    /// Number of users who liked the talk.
    pub fn count_likes(&self, talk_id: i64) -> Result<u64> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE talk_id = ?1",
                params![talk_id],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
    }

    /// Like count of every talk that has at least one like.
    pub fn like_counts(&self) -> Result<HashMap<i64, u64>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT talk_id, COUNT(*) FROM likes GROUP BY talk_id")?;
            let counts = stmt
                .query_map([], |row| {
                    let talk_id: i64 = row.get(0)?;
                    let count: i64 = row.get(1)?;
                    Ok((talk_id, count.max(0) as u64))
                })?
                .collect::<rusqlite::Result<HashMap<i64, u64>>>()?;
            Ok(counts)
        })
    }

    /// Every like of the talk, oldest first.
    pub fn likes_of_talk(&self, talk_id: i64) -> Result<Vec<Like>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_facebook_id, talk_id FROM likes WHERE talk_id = ?1 ORDER BY rowid",
            )?;
            let likes = stmt
                .query_map(params![talk_id], |row| {
                    Ok(Like {
                        user_facebook_id: row.get(0)?,
                        talk_id: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(likes)
        })
    }

    /// Ids of every talk `user` has liked.
    pub fn liked_talk_ids(&self, user: &str) -> Result<HashSet<i64>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT talk_id FROM likes WHERE user_facebook_id = ?1")?;
            let ids = stmt
                .query_map(params![user], |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<i64>>>()?;
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetup_models::{Speaker, Talk};

    fn make_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_speaker(&Speaker::new("100", "Ada")).unwrap();
        db.insert_talk(&Talk::new(1, "First", "100")).unwrap();
        db.insert_talk(&Talk::new(2, "Second", "100")).unwrap();
        db
    }

    #[test]
    fn test_revert_like_toggles() {
        let db = make_db();

        assert!(!db.is_liked_by(1, "user-1").unwrap());
        assert!(db.revert_like(1, "user-1").unwrap());
        assert!(db.is_liked_by(1, "user-1").unwrap());
        assert!(!db.revert_like(1, "user-1").unwrap());
        assert!(!db.is_liked_by(1, "user-1").unwrap());
    }

    #[test]
    fn test_set_like_is_idempotent() {
        let db = make_db();
        db.set_like(1, "user-1").unwrap();
        db.set_like(1, "user-1").unwrap();
        assert_eq!(db.count_likes(1).unwrap(), 1);
    }

    #[test]
    fn test_count_likes_per_talk() {
        let db = make_db();
        db.set_like(1, "user-1").unwrap();
        db.set_like(1, "user-2").unwrap();
        db.set_like(2, "user-1").unwrap();

        assert_eq!(db.count_likes(1).unwrap(), 2);
        assert_eq!(db.count_likes(2).unwrap(), 1);

        db.unset_like(1, "user-2").unwrap();
        assert_eq!(db.count_likes(1).unwrap(), 1);
    }

    #[test]
    fn test_like_counts_in_one_query() {
        let db = make_db();
        db.set_like(1, "user-1").unwrap();
        db.set_like(1, "user-2").unwrap();
        db.set_like(2, "user-2").unwrap();

        let counts = db.like_counts().unwrap();
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));

        db.unset_like(2, "user-2").unwrap();
        assert!(!db.like_counts().unwrap().contains_key(&2));
    }

    #[test]
    fn test_liked_talk_ids() {
        let db = make_db();
        db.set_like(2, "user-1").unwrap();

        let liked = db.liked_talk_ids("user-1").unwrap();
        assert!(liked.contains(&2));
        assert!(!liked.contains(&1));
        assert!(db.liked_talk_ids("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_likes_of_talk() {
        let db = make_db();
        db.set_like(1, "user-2").unwrap();
        db.set_like(1, "user-1").unwrap();

        let likes = db.likes_of_talk(1).unwrap();
        assert_eq!(
            likes,
            vec![
                Like { user_facebook_id: "user-2".into(), talk_id: 1 },
                Like { user_facebook_id: "user-1".into(), talk_id: 1 },
            ]
        );
        assert!(db.likes_of_talk(2).unwrap().is_empty());
    }

    #[test]
    fn test_like_unknown_talk_fails() {
        let db = make_db();
        assert!(db.set_like(99, "user-1").is_err());
    }
}
