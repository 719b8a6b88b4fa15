//! Daily activity streak maintenance.
//!
//! Every counter-moving action touches the streak: a second action the
//! same day is a no-op, the next day extends the streak, and a gap either
//! consumes stored streak freezes (one per missed day) or resets to 1.

use crate::{
    error::RewardResult,
    event::RewardEvent,
    ledger,
    store::RewardStore,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Update the user's streak for activity on `today`. Returns the streak
/// after the touch.
pub fn touch_daily_streak(
    store: &RewardStore,
    user_id: &str,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> RewardResult<i64> {
    let user = store.require_user(user_id)?;

    let (streak, freezes, consumed) = match user.last_active_date {
        Some(last) if last == today => return Ok(user.daily_streak),
        Some(last) => {
            let gap = (today - last).num_days();
            if gap <= 0 {
                // Clock went backwards relative to the stored date; leave
                // the streak alone.
                return Ok(user.daily_streak);
            }
            let missed = gap - 1;
            if missed == 0 {
                (user.daily_streak + 1, user.streak_freezes, 0)
            } else if user.streak_freezes >= missed {
                (user.daily_streak + 1, user.streak_freezes - missed, missed)
            } else {
                (1, user.streak_freezes, 0)
            }
        }
        None => (1, user.streak_freezes, 0),
    };

    store.set_streak_state(user_id, streak, freezes, today)?;

    if consumed > 0 {
        ledger::journal(
            store,
            user_id,
            "streak",
            &RewardEvent::StreakFreezeConsumed {
                user_id: user_id.to_string(),
                consumed,
                remaining: freezes,
            },
            now,
        )?;
        log::info!("user={user_id} streak: consumed {consumed} freeze(s), streak at {streak}");
    }
    ledger::journal(
        store,
        user_id,
        "streak",
        &RewardEvent::StreakAdvanced {
            user_id: user_id.to_string(),
            streak,
        },
        now,
    )?;

    Ok(streak)
}
