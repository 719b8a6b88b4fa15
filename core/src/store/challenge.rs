//! Challenge assignment and completion database queries.
//!
//! Completion inserts are the compare-and-set guard for the reward path:
//! INSERT OR IGNORE against the composite primary key, with the caller
//! branching on whether a row was actually written.

use super::RewardStore;
use crate::{challenge::FlipChallenge, config::TaskAction, error::RewardResult};
use chrono::{DateTime, Utc};
use rusqlite::params;
use std::collections::{HashMap, HashSet};

impl RewardStore {
    // ── Assignment ─────────────────────────────────────────────

    pub fn set_assignment(
        &self,
        user_id: &str,
        challenge: &FlipChallenge,
        assigned_at: DateTime<Utc>,
        progress_start: &HashMap<TaskAction, i64>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE user SET current_challenge = ?1, challenge_assigned_at = ?2,
                             progress_start = ?3
             WHERE user_id = ?4",
            params![
                serde_json::to_string(challenge)?,
                assigned_at.to_rfc3339(),
                serde_json::to_string(progress_start)?,
                user_id
            ],
        )?;
        Ok(())
    }

    pub fn clear_assignment(&self, user_id: &str) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE user SET current_challenge = NULL, challenge_assigned_at = NULL,
                             progress_start = NULL
             WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    // ── Completions ────────────────────────────────────────────

    /// Record a challenge completion. Returns false when the completion
    /// already exists — the caller must then skip the reward side effects.
    pub fn insert_challenge_completion(
        &self,
        user_id: &str,
        challenge_id: &str,
        xp_awarded: i64,
        now: DateTime<Utc>,
    ) -> RewardResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO challenge_completion (user_id, challenge_id, xp_awarded, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, challenge_id, xp_awarded, now.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn completed_challenge_ids(&self, user_id: &str) -> RewardResult<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT challenge_id FROM challenge_completion WHERE user_id = ?1",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    pub fn challenge_completion_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM challenge_completion WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Record one completed flip task action. Returns false if already recorded.
    pub fn insert_task_completion(
        &self,
        user_id: &str,
        action: TaskAction,
        now: DateTime<Utc>,
    ) -> RewardResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO flip_task_completion (user_id, action, completed_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, action.as_str(), now.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn completed_task_actions(&self, user_id: &str) -> RewardResult<HashSet<TaskAction>> {
        let mut stmt = self.conn.prepare(
            "SELECT action FROM flip_task_completion WHERE user_id = ?1",
        )?;
        let raw = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        // Rows written by an older schema with actions this build no longer
        // knows are ignored rather than failing the whole evaluation.
        Ok(raw.iter().filter_map(|s| TaskAction::parse(s)).collect())
    }
}
