//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Evaluators and the engine call store methods — they never execute SQL
//! directly. Submodules split the surface by domain area; each is an
//! `impl RewardStore` block.

use crate::{
    challenge::FlipChallenge,
    config::TaskAction,
    error::{RewardError, RewardResult},
    event::EventLogEntry,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

mod badge;
mod career;
mod challenge;
mod community;
mod feed;
mod promo;
mod wallet;

pub use feed::{NewActivity, NewNotification};
pub use wallet::{NewWalletTxn, WalletRecord, WalletTxnRecord};

pub struct RewardStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

/// A user profile row, with the challenge assignment columns decoded.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub tenant_id: String,
    pub display_name: String,
    pub email: String,
    pub xp_points: i64,
    pub daily_streak: i64,
    pub streak_freezes: i64,
    pub last_active_date: Option<NaiveDate>,
    pub current_challenge: Option<FlipChallenge>,
    pub challenge_assigned_at: Option<DateTime<Utc>>,
    pub progress_start: HashMap<TaskAction, i64>,
    pub created_at: DateTime<Utc>,
}

impl RewardStore {
    pub fn open(path: &str) -> RewardResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RewardResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> RewardResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RewardResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_wallet.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_career.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_community.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/005_challenges.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/006_badges.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/007_feed.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/008_promo.sql"))?;
        Ok(())
    }

    // ── Tenant ─────────────────────────────────────────────────

    pub fn insert_tenant(
        &self,
        tenant_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO tenant (tenant_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![tenant_id, name, now.to_rfc3339()],
        )?;
        Ok(())
    }

    // ── User ───────────────────────────────────────────────────

    pub fn insert_user(
        &self,
        user_id: &str,
        tenant_id: &str,
        display_name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO user (user_id, tenant_id, display_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, tenant_id, display_name, email, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_user(&self, user_id: &str) -> RewardResult<Option<UserRecord>> {
        let row: Option<UserRow> = self
            .conn
            .query_row(
                "SELECT user_id, tenant_id, display_name, email, xp_points,
                        daily_streak, streak_freezes, last_active_date,
                        current_challenge, challenge_assigned_at, progress_start,
                        created_at
                 FROM user WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRow {
                        user_id: row.get(0)?,
                        tenant_id: row.get(1)?,
                        display_name: row.get(2)?,
                        email: row.get(3)?,
                        xp_points: row.get(4)?,
                        daily_streak: row.get(5)?,
                        streak_freezes: row.get(6)?,
                        last_active_date: row.get(7)?,
                        current_challenge: row.get(8)?,
                        challenge_assigned_at: row.get(9)?,
                        progress_start: row.get(10)?,
                        created_at: row.get(11)?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(r) => r.decode().map(Some),
            None => Ok(None),
        }
    }

    /// get_user, but absence is a typed error.
    pub fn require_user(&self, user_id: &str) -> RewardResult<UserRecord> {
        self.get_user(user_id)?.ok_or_else(|| RewardError::UserNotFound {
            user_id: user_id.to_string(),
        })
    }

    pub fn add_user_xp(&self, user_id: &str, amount: i64) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE user SET xp_points = xp_points + ?1 WHERE user_id = ?2",
            params![amount, user_id],
        )?;
        Ok(())
    }

    pub fn set_streak_state(
        &self,
        user_id: &str,
        daily_streak: i64,
        streak_freezes: i64,
        last_active_date: NaiveDate,
    ) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE user SET daily_streak = ?1, streak_freezes = ?2, last_active_date = ?3
             WHERE user_id = ?4",
            params![
                daily_streak,
                streak_freezes,
                last_active_date.format("%Y-%m-%d").to_string(),
                user_id
            ],
        )?;
        Ok(())
    }

    pub fn add_streak_freezes(&self, user_id: &str, count: i64) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE user SET streak_freezes = streak_freezes + ?1 WHERE user_id = ?2",
            params![count, user_id],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (user_id, source, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.user_id,
                entry.source,
                entry.event_type,
                entry.payload,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn events_for_user(&self, user_id: &str) -> RewardResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, source, event_type, payload, created_at
             FROM event_log WHERE user_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        entries
            .into_iter()
            .map(|(id, user_id, source, event_type, payload, created_at)| {
                Ok(EventLogEntry {
                    id: Some(id),
                    user_id,
                    source,
                    event_type,
                    payload,
                    created_at: parse_utc(&created_at)?,
                })
            })
            .collect()
    }

    pub fn event_count_by_type(&self, user_id: &str, event_type: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM event_log WHERE user_id = ?1 AND event_type = ?2",
                params![user_id, event_type],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

// ── Row decoding helpers ───────────────────────────────────────

/// Raw TEXT columns of a user row, before JSON/timestamp decoding.
struct UserRow {
    user_id: String,
    tenant_id: String,
    display_name: String,
    email: String,
    xp_points: i64,
    daily_streak: i64,
    streak_freezes: i64,
    last_active_date: Option<String>,
    current_challenge: Option<String>,
    challenge_assigned_at: Option<String>,
    progress_start: Option<String>,
    created_at: String,
}

impl UserRow {
    fn decode(self) -> RewardResult<UserRecord> {
        let current_challenge = match self.current_challenge {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        let progress_start = match self.progress_start {
            Some(json) => serde_json::from_str(&json)?,
            None => HashMap::new(),
        };
        let challenge_assigned_at = match self.challenge_assigned_at {
            Some(raw) => Some(parse_utc(&raw)?),
            None => None,
        };
        let last_active_date = match self.last_active_date {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };
        Ok(UserRecord {
            user_id: self.user_id,
            tenant_id: self.tenant_id,
            display_name: self.display_name,
            email: self.email,
            xp_points: self.xp_points,
            daily_streak: self.daily_streak,
            streak_freezes: self.streak_freezes,
            last_active_date,
            current_challenge,
            challenge_assigned_at,
            progress_start,
            created_at: parse_utc(&self.created_at)?,
        })
    }
}

pub(crate) fn parse_utc(raw: &str) -> RewardResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Malformed timestamp '{raw}': {e}").into())
}

pub(crate) fn parse_date(raw: &str) -> RewardResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Malformed date '{raw}': {e}").into())
}
