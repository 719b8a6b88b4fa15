use chrono::{DateTime, TimeZone, Utc};
use elevate_core::{
    config::{BadgeCondition, BadgeConfig, RewardConfig},
    engine::RewardEngine,
    store::RewardStore,
};
use std::collections::HashMap;

// ── Test helpers ────────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn badge(id: &str, xp: i64, freezes: i64, condition: BadgeCondition) -> BadgeConfig {
    BadgeConfig {
        badge_id: id.to_string(),
        name: format!("Badge {id}"),
        description: String::new(),
        icon: "star".to_string(),
        xp_reward: xp,
        streak_freeze_reward: freezes,
        condition,
    }
}

/// Engine with a challenge-free catalog so XP totals come from badges only,
/// plus a registered user with an open wallet.
fn engine_with(badges: Vec<BadgeConfig>) -> RewardEngine {
    let store = RewardStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = RewardConfig {
        badges: badges.into_iter().map(|b| (b.badge_id.clone(), b)).collect(),
        challenges: HashMap::new(),
    };
    let engine = RewardEngine::new(config, store, 42);
    engine
        .register_tenant("tenant-a", "Test Network", t0())
        .unwrap();
    engine
        .register_user("alice", "tenant-a", "Alice", "alice@example.org", t0())
        .unwrap();
    engine.wallet("alice", t0()).unwrap();
    engine
}

fn add_scans(engine: &RewardEngine, n: usize) {
    let existing = engine.store().resume_scan_count("alice").unwrap();
    for i in 0..n {
        engine
            .store()
            .insert_resume_scan(
                &format!("scan-{}", existing + i as i64),
                "alice",
                "resume.pdf",
                None,
                t0(),
            )
            .unwrap();
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A resume_5 badge is awarded exactly when the scan count crosses from
/// below 5 to 5 or more.
#[test]
fn resume_badge_awarded_at_threshold() {
    let engine = engine_with(vec![badge(
        "badge-resume-pro",
        100,
        0,
        BadgeCondition::ResumeScans { threshold: 5 },
    )]);

    add_scans(&engine, 4);
    assert!(engine.check_and_award_badges("alice", t0()).is_empty());
    assert_eq!(engine.store().badge_award_count("alice").unwrap(), 0);

    add_scans(&engine, 1);
    let awarded = engine.check_and_award_badges("alice", t0());
    assert_eq!(awarded.len(), 1);
    assert_eq!(awarded[0].badge_id, "badge-resume-pro");
    assert_eq!(engine.store().badge_award_count("alice").unwrap(), 1);

    let user = engine.store().require_user("alice").unwrap();
    assert_eq!(user.xp_points, 100);
}

/// An earned badge is never re-awarded.
#[test]
fn badge_not_awarded_twice() {
    let engine = engine_with(vec![badge(
        "badge-first-scan",
        25,
        0,
        BadgeCondition::ResumeScans { threshold: 1 },
    )]);

    add_scans(&engine, 1);
    assert_eq!(engine.check_and_award_badges("alice", t0()).len(), 1);
    assert!(engine.check_and_award_badges("alice", t0()).is_empty());

    let user = engine.store().require_user("alice").unwrap();
    assert_eq!(user.xp_points, 25);
    assert_eq!(engine.store().wallet_txn_count("alice", "xp").unwrap(), 1);
}

/// A daily-streak badge with a streak-freeze reward grants the freezes,
/// records a second activity entry for them, and notifies once.
#[test]
fn streak_badge_grants_freezes() {
    let engine = engine_with(vec![badge(
        "badge-streak-3",
        50,
        1,
        BadgeCondition::DailyStreak { threshold: 3 },
    )]);
    engine
        .store()
        .set_streak_state("alice", 3, 0, t0().date_naive())
        .unwrap();

    let awarded = engine.check_and_award_badges("alice", t0());

    assert_eq!(awarded.len(), 1);
    let user = engine.store().require_user("alice").unwrap();
    assert_eq!(user.streak_freezes, 1);
    assert_eq!(user.xp_points, 50);
    // Badge activity + streak-freeze activity.
    assert_eq!(engine.store().activity_count("alice").unwrap(), 2);
    assert_eq!(engine.store().notification_count("alice").unwrap(), 1);
}

/// Several badges qualifying in one evaluation are paid as a single summed
/// XP credit.
#[test]
fn batch_award_issues_one_summed_credit() {
    let engine = engine_with(vec![
        badge(
            "badge-first-scan",
            25,
            0,
            BadgeCondition::ResumeScans { threshold: 1 },
        ),
        badge(
            "badge-resume-pro",
            100,
            0,
            BadgeCondition::ResumeScans { threshold: 5 },
        ),
    ]);

    add_scans(&engine, 5);
    let awarded = engine.check_and_award_badges("alice", t0());

    assert_eq!(awarded.len(), 2);
    let user = engine.store().require_user("alice").unwrap();
    assert_eq!(user.xp_points, 125);
    assert_eq!(engine.store().wallet_txn_count("alice", "xp").unwrap(), 1);
}

/// Badge evaluation for an unknown user is an empty list, not an error.
#[test]
fn unknown_user_awards_nothing() {
    let engine = engine_with(vec![badge(
        "badge-first-scan",
        25,
        0,
        BadgeCondition::ResumeScans { threshold: 1 },
    )]);

    assert!(engine.check_and_award_badges("ghost", t0()).is_empty());
}
