//! Community feed database queries: posts and comments.

use super::RewardStore;
use crate::error::RewardResult;
use chrono::{DateTime, Utc};
use rusqlite::params;

impl RewardStore {
    pub fn insert_community_post(
        &self,
        post_id: &str,
        user_id: &str,
        tenant_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO community_post (post_id, user_id, tenant_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![post_id, user_id, tenant_id, body, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn community_post_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM community_post WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn insert_community_comment(
        &self,
        comment_id: &str,
        post_id: &str,
        user_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO community_comment (comment_id, post_id, user_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![comment_id, post_id, user_id, body, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn community_comment_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM community_comment WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
