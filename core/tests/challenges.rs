use chrono::{DateTime, Duration, TimeZone, Utc};
use elevate_core::{
    config::{ChallengeConfig, ChallengeType, RewardConfig, TaskAction, TaskConfig},
    engine::RewardEngine,
    store::RewardStore,
};
use std::collections::HashMap;

// ── Test helpers ────────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn flip(
    id: &str,
    xp: i64,
    a1: TaskAction,
    t1: i64,
    a2: TaskAction,
    t2: i64,
) -> ChallengeConfig {
    ChallengeConfig {
        challenge_id: id.to_string(),
        challenge_type: ChallengeType::Flip,
        title: format!("Challenge {id}"),
        description: String::new(),
        xp_reward: xp,
        active: true,
        tasks: Some(vec![
            TaskConfig {
                description: String::new(),
                action: a1,
                target: t1,
            },
            TaskConfig {
                description: String::new(),
                action: a2,
                target: t2,
            },
        ]),
    }
}

fn engine_with(challenges: Vec<ChallengeConfig>) -> RewardEngine {
    let store = RewardStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = RewardConfig {
        badges: HashMap::new(),
        challenges: challenges
            .into_iter()
            .map(|c| (c.challenge_id.clone(), c))
            .collect(),
    };
    let engine = RewardEngine::new(config, store, 42);
    engine
        .register_tenant("tenant-a", "Test Network", t0())
        .unwrap();
    engine
        .register_user("alice", "tenant-a", "Alice", "alice@example.org", t0())
        .unwrap();
    engine
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two assignment calls inside the 7-day window return the identical
/// challenge object — the second call is a pure read.
#[test]
fn assignment_is_idempotent_within_window() {
    let engine = engine_with(vec![flip(
        "ch-a",
        100,
        TaskAction::AnalyzeResume,
        2,
        TaskAction::CommunityPost,
        1,
    )]);

    let first = engine
        .dynamic_flip_challenge("alice", t0())
        .unwrap()
        .expect("enough tasks to assign");
    let second = engine
        .dynamic_flip_challenge("alice", t0() + Duration::days(3))
        .unwrap()
        .expect("window still open");

    assert_eq!(first, second);
}

/// Once the 7-day window has elapsed, a fresh challenge with a new
/// synthetic id is assigned.
#[test]
fn reassignment_after_window_expiry() {
    let engine = engine_with(vec![flip(
        "ch-a",
        100,
        TaskAction::AnalyzeResume,
        2,
        TaskAction::CommunityPost,
        1,
    )]);

    let first = engine
        .dynamic_flip_challenge("alice", t0())
        .unwrap()
        .unwrap();
    let second = engine
        .dynamic_flip_challenge("alice", t0() + Duration::days(8))
        .unwrap()
        .expect("uncompleted tasks remain");

    assert_ne!(first.challenge_id, second.challenge_id);
    assert!(second.challenge_id.starts_with("dynamic-"));
}

/// Fewer than two uncompleted flip tasks platform-wide: assignment fails
/// softly and leaves the user untouched.
#[test]
fn insufficient_tasks_returns_none_without_mutation() {
    let engine = engine_with(vec![flip(
        "ch-a",
        100,
        TaskAction::AnalyzeResume,
        2,
        TaskAction::CommunityPost,
        1,
    )]);
    // One of the two catalog actions is already done — pool shrinks to 1.
    engine
        .store()
        .insert_task_completion("alice", TaskAction::AnalyzeResume, t0())
        .unwrap();

    let assigned = engine.dynamic_flip_challenge("alice", t0()).unwrap();

    assert!(assigned.is_none());
    let user = engine.store().require_user("alice").unwrap();
    assert!(user.current_challenge.is_none());
    assert!(user.challenge_assigned_at.is_none());
    assert!(user.progress_start.is_empty());
}

/// Assignment for an unknown user is None, not an error.
#[test]
fn unknown_user_returns_none() {
    let engine = engine_with(vec![flip(
        "ch-a",
        100,
        TaskAction::AnalyzeResume,
        2,
        TaskAction::CommunityPost,
        1,
    )]);

    assert!(engine.dynamic_flip_challenge("ghost", t0()).unwrap().is_none());
}

/// The per-action baseline captured at assignment equals the user's live
/// counter at that moment.
#[test]
fn baseline_captured_from_live_counters() {
    let engine = engine_with(vec![flip(
        "ch-a",
        100,
        TaskAction::AnalyzeResume,
        2,
        TaskAction::AddJobApplication,
        1,
    )]);
    engine
        .store()
        .insert_resume_scan("scan-1", "alice", "resume.pdf", None, t0())
        .unwrap();
    engine
        .store()
        .insert_resume_scan("scan-2", "alice", "resume.pdf", None, t0())
        .unwrap();

    let assigned = engine
        .dynamic_flip_challenge("alice", t0())
        .unwrap()
        .unwrap();
    assert_eq!(assigned.tasks.len(), 2);

    let user = engine.store().require_user("alice").unwrap();
    assert_eq!(
        user.progress_start.get(&TaskAction::AnalyzeResume).copied(),
        Some(2)
    );
    assert_eq!(
        user.progress_start
            .get(&TaskAction::AddJobApplication)
            .copied(),
        Some(0)
    );
}

/// The synthesized challenge's XP reward is the rounded average of the two
/// picked tasks' inherited rewards.
#[test]
fn xp_reward_is_rounded_average_of_pair() {
    let engine = engine_with(vec![
        flip(
            "ch-a",
            100,
            TaskAction::AnalyzeResume,
            2,
            TaskAction::CommunityPost,
            1,
        ),
        flip(
            "ch-b",
            51,
            TaskAction::Refer,
            1,
            TaskAction::BookAppointment,
            1,
        ),
    ]);
    // Retire one task from each catalog challenge so the pool is exactly
    // one 100-XP task plus one 51-XP task.
    engine
        .store()
        .insert_task_completion("alice", TaskAction::CommunityPost, t0())
        .unwrap();
    engine
        .store()
        .insert_task_completion("alice", TaskAction::BookAppointment, t0())
        .unwrap();

    let assigned = engine
        .dynamic_flip_challenge("alice", t0())
        .unwrap()
        .unwrap();

    // round((100 + 51) / 2) = 76
    assert_eq!(assigned.xp_reward, 76);
}
