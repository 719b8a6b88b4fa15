//! The reward engine — the composition root of the platform core.
//!
//! REWARD SEQUENCE (fixed, documented, never reordered):
//!   1. The feature action's primary write (scan, post, referral, ...)
//!   2. Daily streak touch
//!   3. Challenge progress evaluation (XP, completions)
//!   4. Badge evaluation (awards, summed XP, streak freezes)
//!
//! RULES:
//!   - Steps 2-4 are best-effort: a failure is logged and swallowed, and
//!     the primary write stays durable. There is no compensating action;
//!     the event journal is the audit trail for partial sequences.
//!   - All randomness flows through the RngBank.
//!   - Only the store talks to the database.

use crate::{
    badge,
    challenge::{self, FlipChallenge},
    config::{BadgeConfig, RewardConfig},
    error::RewardResult,
    event::RewardEvent,
    ledger::{self, WalletSummary},
    progress,
    rng::RngBank,
    store::{RewardStore, UserRecord, WalletRecord},
    streak,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct RewardEngine {
    config: RewardConfig,
    store: RewardStore,
    rng_bank: RngBank,
}

impl RewardEngine {
    pub fn new(config: RewardConfig, store: RewardStore, master_seed: u64) -> Self {
        Self {
            config,
            store,
            rng_bank: RngBank::new(master_seed),
        }
    }

    /// Build a fully wired engine: load catalogs from `data_dir`, open the
    /// database at `db_path`, and apply migrations.
    pub fn build(data_dir: &str, db_path: &str, master_seed: u64) -> anyhow::Result<Self> {
        let config = RewardConfig::load(data_dir)?;
        let store = RewardStore::open(db_path)?;
        store.migrate()?;
        Ok(Self::new(config, store, master_seed))
    }

    /// Engine over an in-memory database with the test catalogs.
    pub fn build_test(master_seed: u64) -> RewardResult<Self> {
        let store = RewardStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(RewardConfig::default_test(), store, master_seed))
    }

    pub fn store(&self) -> &RewardStore {
        &self.store
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    // ── Onboarding ─────────────────────────────────────────────

    pub fn register_tenant(
        &self,
        tenant_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.store.insert_tenant(tenant_id, name, now)
    }

    pub fn register_user(
        &self,
        user_id: &str,
        tenant_id: &str,
        display_name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.store
            .insert_user(user_id, tenant_id, display_name, email, now)
    }

    // ── Reward ledger ──────────────────────────────────────────

    pub fn wallet(&self, user_id: &str, now: DateTime<Utc>) -> RewardResult<WalletSummary> {
        ledger::wallet(&self.store, user_id, now)
    }

    pub fn update_wallet(
        &self,
        user_id: &str,
        coins: Option<i64>,
        flash_coins: Option<i64>,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> RewardResult<WalletRecord> {
        ledger::update_wallet(&self.store, user_id, coins, flash_coins, description, now)
    }

    pub fn add_xp(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<Option<UserRecord>> {
        ledger::add_xp(&self.store, user_id, amount, description, now)
    }

    // ── Challenges and badges ──────────────────────────────────

    pub fn dynamic_flip_challenge(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<Option<FlipChallenge>> {
        let mut rng = self.rng_bank.for_user(user_id);
        challenge::dynamic_flip_challenge(&self.store, &self.config, user_id, now, &mut rng)
    }

    /// Best-effort progress evaluation: errors are logged and the caller
    /// sees None, never a failure.
    pub fn check_challenge_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Option<UserRecord> {
        match progress::check_challenge_progress(&self.store, &self.config, user_id, now) {
            Ok(user) => user,
            Err(e) => {
                log::error!("user={user_id} engine: progress evaluation failed: {e}");
                None
            }
        }
    }

    /// Best-effort badge evaluation: errors are logged and the caller sees
    /// an empty list, never a failure.
    pub fn check_and_award_badges(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<BadgeConfig> {
        match badge::check_and_award_badges(&self.store, &self.config, user_id, now) {
            Ok(badges) => badges,
            Err(e) => {
                log::error!("user={user_id} engine: badge evaluation failed: {e}");
                Vec::new()
            }
        }
    }

    // ── Feature actions ────────────────────────────────────────
    //
    // Each performs its primary write, then runs the reward sequence
    // fire-and-forget. The primary write's result is returned even when
    // the reward path fails.

    pub fn record_resume_scan(
        &self,
        user_id: &str,
        file_name: &str,
        score: Option<f64>,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let scan_id = Uuid::new_v4().to_string();
        self.store
            .insert_resume_scan(&scan_id, user_id, file_name, score, now)?;
        self.after_action(user_id, now);
        Ok(scan_id)
    }

    pub fn record_job_application(
        &self,
        user_id: &str,
        company: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let application_id = Uuid::new_v4().to_string();
        self.store
            .insert_job_application(&application_id, user_id, company, role, "applied", now)?;
        self.after_action(user_id, now);
        Ok(application_id)
    }

    pub fn record_community_post(
        &self,
        user_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let user = self.store.require_user(user_id)?;
        let post_id = Uuid::new_v4().to_string();
        self.store
            .insert_community_post(&post_id, user_id, &user.tenant_id, body, now)?;
        self.after_action(user_id, now);
        Ok(post_id)
    }

    pub fn record_community_comment(
        &self,
        user_id: &str,
        post_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let comment_id = Uuid::new_v4().to_string();
        self.store
            .insert_community_comment(&comment_id, post_id, user_id, body, now)?;
        self.after_action(user_id, now);
        Ok(comment_id)
    }

    pub fn record_referral(
        &self,
        referrer_id: &str,
        invitee_email: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let referral_id = Uuid::new_v4().to_string();
        self.store
            .insert_referral(&referral_id, referrer_id, invitee_email, "pending", now)?;
        // Pending referrals don't move the qualifying counter; the reward
        // pass still runs for the streak touch.
        self.after_action(referrer_id, now);
        Ok(referral_id)
    }

    /// The invitee signed up — the referral now counts for the referrer.
    pub fn record_referral_signup(
        &self,
        referral_id: &str,
        referrer_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.store.update_referral_status(referral_id, "signed_up")?;
        self.after_action(referrer_id, now);
        Ok(())
    }

    pub fn record_appointment(
        &self,
        requester_id: &str,
        provider_id: &str,
        kind: &str,
        scheduled_for: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let appointment_id = Uuid::new_v4().to_string();
        self.store.insert_appointment(
            &appointment_id,
            requester_id,
            provider_id,
            kind,
            scheduled_for,
            now,
        )?;
        self.after_action(requester_id, now);
        Ok(appointment_id)
    }

    pub fn record_survey_response(
        &self,
        user_id: &str,
        survey_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<String> {
        let response_id = Uuid::new_v4().to_string();
        self.store
            .insert_survey_response(&response_id, user_id, survey_id, now)?;
        self.after_action(user_id, now);
        Ok(response_id)
    }

    /// Redeem a promo code (transactional), then run the reward sequence.
    pub fn redeem_promo_code(
        &self,
        user_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<i64> {
        let coins =
            self.store
                .redeem_promo_code(user_id, code, ledger::STARTING_COINS, now)?;
        ledger::journal(
            &self.store,
            user_id,
            "promo",
            &RewardEvent::PromoRedeemed {
                user_id: user_id.to_string(),
                code: code.to_string(),
                coins,
            },
            now,
        )?;
        self.after_action(user_id, now);
        Ok(coins)
    }

    /// The fire-and-forget reward sequence shared by every feature action.
    fn after_action(&self, user_id: &str, now: DateTime<Utc>) {
        if let Err(e) = streak::touch_daily_streak(&self.store, user_id, now.date_naive(), now) {
            log::warn!("user={user_id} engine: streak touch failed: {e}");
        }
        // Badge evaluation transitively re-evaluates challenge progress.
        let _ = self.check_and_award_badges(user_id, now);
    }
}
