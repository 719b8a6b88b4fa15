//! Activity and notification database queries — the append-only records
//! the reward path emits to announce rewards. Nothing in this crate reads
//! them back except tests and the runner's summary.

use super::RewardStore;
use crate::error::RewardResult;
use chrono::{DateTime, Utc};
use rusqlite::params;

#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub user_id: &'a str,
    pub tenant_id: &'a str,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification<'a> {
    pub user_id: &'a str,
    pub notif_type: &'a str,
    pub content: String,
    pub link: &'a str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl RewardStore {
    pub fn insert_activity(&self, activity: &NewActivity) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO activity (user_id, tenant_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                activity.user_id,
                activity.tenant_id,
                activity.description,
                activity.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_notification(&self, notification: &NewNotification) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO notification (user_id, notif_type, content, link, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                notification.user_id,
                notification.notif_type,
                notification.content,
                notification.link,
                if notification.is_read { 1i32 } else { 0i32 },
                notification.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn activity_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM activity WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn notification_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM notification WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn latest_activity_descriptions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> RewardResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT description FROM activity WHERE user_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }
}
