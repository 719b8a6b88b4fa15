//! Badge evaluation and award issuance.
//!
//! Challenge progress runs first so challenge XP is already applied when
//! badge stats are read. Newly qualifying badges get an award row (the
//! compare-and-set guard), an activity entry, a notification, and — once,
//! after the loop — a single summed XP credit and streak-freeze grant.

use crate::{
    config::{BadgeCondition, BadgeConfig, RewardConfig, TaskAction},
    counters::CounterSource,
    error::RewardResult,
    event::RewardEvent,
    ledger, progress,
    store::{NewActivity, NewNotification, RewardStore},
};
use chrono::{DateTime, Utc};

/// Evaluate all badges for the user and award any newly earned ones.
/// Returns the newly awarded badge definitions; empty when the user is
/// unknown or nothing qualified.
pub fn check_and_award_badges(
    store: &RewardStore,
    config: &RewardConfig,
    user_id: &str,
    now: DateTime<Utc>,
) -> RewardResult<Vec<BadgeConfig>> {
    // Challenge XP must land before badge stats are read.
    let user = match progress::check_challenge_progress(store, config, user_id, now)? {
        Some(user) => user,
        None => return Ok(Vec::new()),
    };

    let resume_scans = store.count(user_id, TaskAction::AnalyzeResume)?;
    let earned = store.earned_badge_ids(user_id)?;

    let mut catalog: Vec<&BadgeConfig> = config.badges.values().collect();
    catalog.sort_by(|a, b| a.badge_id.cmp(&b.badge_id));

    let mut newly_awarded: Vec<BadgeConfig> = Vec::new();
    for badge in catalog {
        if earned.contains(&badge.badge_id) {
            continue;
        }
        let satisfied = match badge.condition {
            BadgeCondition::DailyStreak { threshold } => user.daily_streak >= threshold,
            BadgeCondition::ResumeScans { threshold } => resume_scans >= threshold,
        };
        if !satisfied {
            continue;
        }
        // A concurrent evaluation may have awarded it between our read and
        // this insert; the loser skips the side effects.
        if !store.insert_badge_award(user_id, &badge.badge_id, now)? {
            continue;
        }

        store.insert_activity(&NewActivity {
            user_id,
            tenant_id: &user.tenant_id,
            description: format!("Earned the \"{}\" badge", badge.name),
            created_at: now,
        })?;
        if badge.streak_freeze_reward > 0 {
            store.insert_activity(&NewActivity {
                user_id,
                tenant_id: &user.tenant_id,
                description: format!(
                    "Received {} streak freeze(s) from the \"{}\" badge",
                    badge.streak_freeze_reward, badge.name
                ),
                created_at: now,
            })?;
        }
        store.insert_notification(&NewNotification {
            user_id,
            notif_type: "system",
            content: format!("You earned the \"{}\" badge!", badge.name),
            link: "/gamification",
            is_read: false,
            created_at: now,
        })?;
        ledger::journal(
            store,
            user_id,
            "badge",
            &RewardEvent::BadgeAwarded {
                user_id: user_id.to_string(),
                badge_id: badge.badge_id.clone(),
                xp_reward: badge.xp_reward,
                streak_freeze_reward: badge.streak_freeze_reward,
            },
            now,
        )?;
        log::info!(
            "user={user_id} badge: awarded {} (+{} XP)",
            badge.badge_id,
            badge.xp_reward
        );

        newly_awarded.push(badge.clone());
    }

    if !newly_awarded.is_empty() {
        let xp_total: i64 = newly_awarded.iter().map(|b| b.xp_reward).sum();
        let freeze_total: i64 = newly_awarded.iter().map(|b| b.streak_freeze_reward).sum();
        let _ = ledger::add_xp(store, user_id, xp_total, "XP reward from new badges", now)?;
        if freeze_total > 0 {
            store.add_streak_freezes(user_id, freeze_total)?;
        }
    }

    Ok(newly_awarded)
}
