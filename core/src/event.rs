//! The reward event journal.
//!
//! RULE: Every grant, completion, and award the reward path issues is
//! recorded in event_log before the call returns. The reward sequence is
//! best-effort (failures never roll back the primary action), so the
//! journal is the only place a partial sequence can be observed.

use crate::config::TaskAction;
use crate::types::{BadgeId, ChallengeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every event the reward path can emit.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEvent {
    // ── Ledger events ──────────────────────────────
    WalletCreated {
        user_id: UserId,
        starting_coins: i64,
    },
    CoinsAdjusted {
        user_id: UserId,
        old_coins: i64,
        new_coins: i64,
    },
    XpGranted {
        user_id: UserId,
        amount: i64,
        description: String,
    },

    // ── Challenge events ───────────────────────────
    ChallengeAssigned {
        user_id: UserId,
        challenge_id: ChallengeId,
        xp_reward: i64,
        actions: Vec<TaskAction>,
    },
    ChallengeCompleted {
        user_id: UserId,
        challenge_id: ChallengeId,
        title: String,
        xp_reward: i64,
    },

    // ── Badge events ───────────────────────────────
    BadgeAwarded {
        user_id: UserId,
        badge_id: BadgeId,
        xp_reward: i64,
        streak_freeze_reward: i64,
    },

    // ── Streak events ──────────────────────────────
    StreakAdvanced {
        user_id: UserId,
        streak: i64,
    },
    StreakFreezeConsumed {
        user_id: UserId,
        consumed: i64,
        remaining: i64,
    },

    // ── Promo events ───────────────────────────────
    PromoRedeemed {
        user_id: UserId,
        code: String,
        coins: i64,
    },
}

/// One persisted row of the event journal.
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub source: String,
    pub event_type: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// Extract a stable string name from a RewardEvent variant.
/// Used for the event_type column in event_log.
pub fn event_type_name(event: &RewardEvent) -> &'static str {
    match event {
        RewardEvent::WalletCreated { .. }        => "wallet_created",
        RewardEvent::CoinsAdjusted { .. }        => "coins_adjusted",
        RewardEvent::XpGranted { .. }            => "xp_granted",
        RewardEvent::ChallengeAssigned { .. }    => "challenge_assigned",
        RewardEvent::ChallengeCompleted { .. }   => "challenge_completed",
        RewardEvent::BadgeAwarded { .. }         => "badge_awarded",
        RewardEvent::StreakAdvanced { .. }       => "streak_advanced",
        RewardEvent::StreakFreezeConsumed { .. } => "streak_freeze_consumed",
        RewardEvent::PromoRedeemed { .. }        => "promo_redeemed",
    }
}
