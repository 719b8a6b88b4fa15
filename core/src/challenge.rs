//! Flip-challenge assignment.
//!
//! A flip challenge is a dynamically assembled pair of cross-feature tasks.
//! Assignment is idempotent within the 7-day window; after the window (or
//! after completion clears the slot) a fresh pair is drawn from the
//! catalog, excluding task actions the user already completed.

use crate::{
    config::{ChallengeType, RewardConfig, TaskAction},
    counters::CounterSource,
    error::RewardResult,
    event::RewardEvent,
    ledger,
    rng::RewardRng,
    store::RewardStore,
    types::ChallengeId,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Days an assignment stays pinned before it can be replaced.
pub const ASSIGNMENT_WINDOW_DAYS: i64 = 7;
/// A flip challenge is always a pair.
pub const FLIP_TASK_COUNT: usize = 2;

/// One task inside a synthesized flip challenge. Carries the catalog
/// challenge it was lifted from and inherits that challenge's XP reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipTask {
    pub source_challenge_id: ChallengeId,
    pub description: String,
    pub action: TaskAction,
    pub target: i64,
    pub xp_reward: i64,
}

/// A synthesized flip challenge, persisted on the user while active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipChallenge {
    pub challenge_id: ChallengeId,
    pub title: String,
    pub description: String,
    pub xp_reward: i64,
    pub tasks: Vec<FlipTask>,
}

/// Return the user's current flip challenge, assigning a fresh one when
/// none is active. None when the user is unknown or fewer than two
/// uncompleted tasks remain platform-wide.
pub fn dynamic_flip_challenge(
    store: &RewardStore,
    config: &RewardConfig,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut RewardRng,
) -> RewardResult<Option<FlipChallenge>> {
    let user = match store.get_user(user_id)? {
        Some(user) => user,
        None => return Ok(None),
    };

    // Idempotent read: an assignment under 7 days old is returned as-is.
    if let (Some(current), Some(assigned_at)) =
        (&user.current_challenge, user.challenge_assigned_at)
    {
        if now - assigned_at < Duration::days(ASSIGNMENT_WINDOW_DAYS) {
            return Ok(Some(current.clone()));
        }
    }

    let completed_actions = store.completed_task_actions(user_id)?;

    // Flatten every active flip challenge's tasks, tagged with their
    // parent, and drop actions the user has already completed.
    let mut pool: Vec<FlipTask> = config
        .challenges
        .values()
        .filter(|c| c.challenge_type == ChallengeType::Flip && c.active)
        .filter_map(|c| c.tasks.as_ref().map(|tasks| (c, tasks)))
        .flat_map(|(c, tasks)| {
            tasks.iter().map(move |t| FlipTask {
                source_challenge_id: c.challenge_id.clone(),
                description: t.description.clone(),
                action: t.action,
                target: t.target,
                xp_reward: c.xp_reward,
            })
        })
        .filter(|t| !completed_actions.contains(&t.action))
        .collect();

    if pool.len() < FLIP_TASK_COUNT {
        log::debug!(
            "user={user_id} challenge: only {} uncompleted flip tasks, not assigning",
            pool.len()
        );
        return Ok(None);
    }

    // Deterministic order before the shuffle — the catalog map iterates in
    // arbitrary order.
    pool.sort_by(|a, b| {
        (a.source_challenge_id.as_str(), a.action.as_str())
            .cmp(&(b.source_challenge_id.as_str(), b.action.as_str()))
    });
    rng.shuffle(&mut pool);
    pool.truncate(FLIP_TASK_COUNT);

    let xp_reward =
        (pool.iter().map(|t| t.xp_reward).sum::<i64>() as f64 / pool.len() as f64).round() as i64;

    // Baseline each task's action at the user's current live counter so
    // progress only counts work done after assignment.
    let mut progress_start: HashMap<TaskAction, i64> = HashMap::new();
    for task in &pool {
        progress_start.insert(task.action, store.count(user_id, task.action)?);
    }

    let challenge = FlipChallenge {
        challenge_id: format!("dynamic-{}", now.timestamp_millis()),
        title: "Flip Challenge".to_string(),
        description: format!("Complete both tasks this week to earn {xp_reward} XP"),
        xp_reward,
        tasks: pool,
    };

    store.set_assignment(user_id, &challenge, now, &progress_start)?;
    ledger::journal(
        store,
        user_id,
        "challenge",
        &RewardEvent::ChallengeAssigned {
            user_id: user_id.to_string(),
            challenge_id: challenge.challenge_id.clone(),
            xp_reward: challenge.xp_reward,
            actions: challenge.tasks.iter().map(|t| t.action).collect(),
        },
        now,
    )?;
    log::info!(
        "user={user_id} challenge: assigned {} ({} + {}, {} XP)",
        challenge.challenge_id,
        challenge.tasks[0].action.as_str(),
        challenge.tasks[1].action.as_str(),
        challenge.xp_reward
    );

    Ok(Some(challenge))
}
