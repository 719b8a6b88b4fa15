//! Badge award database queries.

use super::RewardStore;
use crate::error::RewardResult;
use chrono::{DateTime, Utc};
use rusqlite::params;
use std::collections::HashSet;

impl RewardStore {
    /// Record a badge award. Returns false when the badge was already
    /// earned — a concurrent evaluation won the race and the caller must
    /// not re-issue the reward.
    pub fn insert_badge_award(
        &self,
        user_id: &str,
        badge_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO badge_award (user_id, badge_id, awarded_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, badge_id, now.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn earned_badge_ids(&self, user_id: &str) -> RewardResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge_id FROM badge_award WHERE user_id = ?1")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    pub fn badge_award_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM badge_award WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
