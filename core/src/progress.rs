//! Challenge progress evaluation and XP issuance.
//!
//! Catalog flip challenges are lifetime milestones: their task targets are
//! compared against the user's absolute counters. The user's assigned
//! dynamic challenge is baseline-relative: each task must move its counter
//! `target` past the value captured at assignment time.
//!
//! The reward sequence is best-effort. A failure inside one challenge's
//! side effects is logged and skipped; completions already recorded stay
//! recorded.

use crate::{
    config::{ChallengeType, RewardConfig, TaskAction},
    counters::CounterSource,
    error::RewardResult,
    event::RewardEvent,
    ledger,
    store::{NewActivity, NewNotification, RewardStore, UserRecord},
    types::ChallengeId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

struct Candidate {
    challenge_id: ChallengeId,
    title: String,
    xp_reward: i64,
    tasks: Vec<(TaskAction, i64)>,
    /// Baselines apply only to the user's assigned dynamic challenge.
    baselines: Option<HashMap<TaskAction, i64>>,
}

/// Re-evaluate every open flip challenge for the user, crediting XP and
/// recording completions for any whose tasks are all satisfied. Returns
/// the reloaded user profile, or None when the user is unknown.
pub fn check_challenge_progress(
    store: &RewardStore,
    config: &RewardConfig,
    user_id: &str,
    now: DateTime<Utc>,
) -> RewardResult<Option<UserRecord>> {
    let user = match store.get_user(user_id)? {
        Some(user) => user,
        None => return Ok(None),
    };
    let completed = store.completed_challenge_ids(user_id)?;

    let mut candidates: Vec<Candidate> = config
        .challenges
        .values()
        .filter(|c| c.challenge_type == ChallengeType::Flip && c.active)
        .filter(|c| !completed.contains(&c.challenge_id))
        .filter_map(|c| c.tasks.as_ref().map(|tasks| (c, tasks)))
        .map(|(c, tasks)| Candidate {
            challenge_id: c.challenge_id.clone(),
            title: c.title.clone(),
            xp_reward: c.xp_reward,
            tasks: tasks.iter().map(|t| (t.action, t.target)).collect(),
            baselines: None,
        })
        .collect();
    candidates.sort_by(|a, b| a.challenge_id.cmp(&b.challenge_id));

    if let Some(current) = &user.current_challenge {
        if !completed.contains(&current.challenge_id) {
            candidates.push(Candidate {
                challenge_id: current.challenge_id.clone(),
                title: current.title.clone(),
                xp_reward: current.xp_reward,
                tasks: current.tasks.iter().map(|t| (t.action, t.target)).collect(),
                baselines: Some(user.progress_start.clone()),
            });
        }
    }

    let mut any_completed = false;
    for candidate in &candidates {
        match evaluate_candidate(store, &user, candidate, now) {
            Ok(true) => any_completed = true,
            Ok(false) => {}
            Err(e) => {
                log::warn!(
                    "user={user_id} progress: challenge {} evaluation failed: {e}",
                    candidate.challenge_id
                );
            }
        }
    }

    // Any completion frees the assignment slot for a fresh pair.
    if any_completed {
        store.clear_assignment(user_id)?;
    }

    store.get_user(user_id)
}

/// Evaluate one challenge; on full completion issue its rewards.
/// Returns true only when THIS call recorded the completion.
fn evaluate_candidate(
    store: &RewardStore,
    user: &UserRecord,
    candidate: &Candidate,
    now: DateTime<Utc>,
) -> RewardResult<bool> {
    for (action, target) in &candidate.tasks {
        let live = store.count(&user.user_id, *action)?;
        let floor = candidate
            .baselines
            .as_ref()
            .and_then(|b| b.get(action).copied())
            .unwrap_or(0);
        if live < floor + target {
            return Ok(false);
        }
    }

    // The completion row is the compare-and-set guard: if another
    // evaluation already recorded it, skip the rewards entirely.
    if !store.insert_challenge_completion(
        &user.user_id,
        &candidate.challenge_id,
        candidate.xp_reward,
        now,
    )? {
        return Ok(false);
    }

    // A completed dynamic pair retires both actions from future draws.
    if candidate.baselines.is_some() {
        for (action, _) in &candidate.tasks {
            store.insert_task_completion(&user.user_id, *action, now)?;
        }
    }

    let _ = ledger::add_xp(
        store,
        &user.user_id,
        candidate.xp_reward,
        &format!("Flip Challenge: {}", candidate.title),
        now,
    )?;
    store.insert_activity(&NewActivity {
        user_id: &user.user_id,
        tenant_id: &user.tenant_id,
        description: format!(
            "Completed the \"{}\" challenge (+{} XP)",
            candidate.title, candidate.xp_reward
        ),
        created_at: now,
    })?;
    store.insert_notification(&NewNotification {
        user_id: &user.user_id,
        notif_type: "system",
        content: format!(
            "Challenge complete! \"{}\" earned you {} XP.",
            candidate.title, candidate.xp_reward
        ),
        link: "/challenges",
        is_read: false,
        created_at: now,
    })?;
    ledger::journal(
        store,
        &user.user_id,
        "progress",
        &RewardEvent::ChallengeCompleted {
            user_id: user.user_id.clone(),
            challenge_id: candidate.challenge_id.clone(),
            title: candidate.title.clone(),
            xp_reward: candidate.xp_reward,
        },
        now,
    )?;
    log::info!(
        "user={} progress: completed {} (+{} XP)",
        user.user_id,
        candidate.challenge_id,
        candidate.xp_reward
    );

    Ok(true)
}
