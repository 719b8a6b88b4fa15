//! Read-through counter aggregation.
//!
//! RULE: Evaluators never query tables themselves — they ask a
//! CounterSource for the live value of one metric. Counters are recomputed
//! from related records on every call and never cached beyond it, so an
//! evaluation always sees the latest primary writes.

use crate::{config::TaskAction, error::RewardResult, store::RewardStore};

/// The one seam between the evaluators and the storage shape.
pub trait CounterSource {
    /// The user's current live count for the metric behind `action`.
    fn count(&self, user_id: &str, action: TaskAction) -> RewardResult<i64>;
}

impl CounterSource for RewardStore {
    fn count(&self, user_id: &str, action: TaskAction) -> RewardResult<i64> {
        match action {
            TaskAction::AnalyzeResume     => self.resume_scan_count(user_id),
            TaskAction::AddJobApplication => self.job_application_count(user_id),
            TaskAction::CommunityPost     => self.community_post_count(user_id),
            TaskAction::CommunityComment  => self.community_comment_count(user_id),
            TaskAction::Refer             => self.qualifying_referral_count(user_id),
            TaskAction::BookAppointment   => self.appointment_count_as_requester(user_id),
            TaskAction::TakeSurvey        => self.survey_response_count(user_id),
            TaskAction::DailyLogin        => Ok(self.require_user(user_id)?.daily_streak),
        }
    }
}
