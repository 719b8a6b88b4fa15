//! Career-record database queries: resume scans, job applications,
//! appointments, referrals, survey responses.

use super::RewardStore;
use crate::error::RewardResult;
use chrono::{DateTime, Utc};
use rusqlite::params;

impl RewardStore {
    // ── Resume scans ───────────────────────────────────────────

    pub fn insert_resume_scan(
        &self,
        scan_id: &str,
        user_id: &str,
        file_name: &str,
        score: Option<f64>,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO resume_scan (scan_id, user_id, file_name, score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![scan_id, user_id, file_name, score, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn resume_scan_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM resume_scan WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Job applications ───────────────────────────────────────

    pub fn insert_job_application(
        &self,
        application_id: &str,
        user_id: &str,
        company: &str,
        role: &str,
        status: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO job_application (application_id, user_id, company, role, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![application_id, user_id, company, role, status, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn job_application_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM job_application WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Appointments ───────────────────────────────────────────

    pub fn insert_appointment(
        &self,
        appointment_id: &str,
        requester_id: &str,
        provider_id: &str,
        kind: &str,
        scheduled_for: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO appointment (appointment_id, requester_id, provider_id, kind, scheduled_for, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                appointment_id,
                requester_id,
                provider_id,
                kind,
                scheduled_for.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Appointments where the user is the requester (not the provider).
    pub fn appointment_count_as_requester(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM appointment WHERE requester_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Referrals ──────────────────────────────────────────────

    pub fn insert_referral(
        &self,
        referral_id: &str,
        referrer_id: &str,
        invitee_email: &str,
        status: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO referral (referral_id, referrer_id, invitee_email, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![referral_id, referrer_id, invitee_email, status, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn update_referral_status(&self, referral_id: &str, status: &str) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE referral SET status = ?1 WHERE referral_id = ?2",
            params![status, referral_id],
        )?;
        Ok(())
    }

    /// Only referrals that actually converted count toward challenges.
    pub fn qualifying_referral_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM referral
                 WHERE referrer_id = ?1 AND status IN ('signed_up', 'reward_earned')",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Survey responses ───────────────────────────────────────

    pub fn insert_survey_response(
        &self,
        response_id: &str,
        user_id: &str,
        survey_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO survey_response (response_id, user_id, survey_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![response_id, user_id, survey_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn survey_response_count(&self, user_id: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM survey_response WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
