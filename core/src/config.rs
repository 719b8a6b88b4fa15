//! Badge and challenge catalogs.
//!
//! Catalogs are read-only after load. Badge trigger conditions are parsed
//! into a closed tagged union at load time; a catalog entry with an unknown
//! condition key is rejected here, not silently skipped at evaluation time.
//! Malformed challenge task lists, by contrast, are tolerated: the
//! assignment step only gathers flip challenges that actually carry tasks.

use crate::error::{RewardError, RewardResult};
use crate::types::{BadgeId, ChallengeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every action a challenge task can ask a user to perform.
/// `take_survey` and `daily_login` exist for standard challenges and are
/// never selected into flip pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    AnalyzeResume,
    AddJobApplication,
    CommunityPost,
    CommunityComment,
    Refer,
    BookAppointment,
    TakeSurvey,
    DailyLogin,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeResume     => "analyze_resume",
            Self::AddJobApplication => "add_job_application",
            Self::CommunityPost     => "community_post",
            Self::CommunityComment  => "community_comment",
            Self::Refer             => "refer",
            Self::BookAppointment   => "book_appointment",
            Self::TakeSurvey        => "take_survey",
            Self::DailyLogin        => "daily_login",
        }
    }

    /// Parse the database TEXT form back into the enum.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "analyze_resume"      => Some(Self::AnalyzeResume),
            "add_job_application" => Some(Self::AddJobApplication),
            "community_post"      => Some(Self::CommunityPost),
            "community_comment"   => Some(Self::CommunityComment),
            "refer"               => Some(Self::Refer),
            "book_appointment"    => Some(Self::BookAppointment),
            "take_survey"         => Some(Self::TakeSurvey),
            "daily_login"         => Some(Self::DailyLogin),
            _ => None,
        }
    }
}

/// A badge trigger condition, validated at catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeCondition {
    DailyStreak { threshold: i64 },
    ResumeScans { threshold: i64 },
}

impl BadgeCondition {
    /// Parse the catalog-file form `"<key>_<threshold>"`, e.g. `"resume_5"`.
    /// Unknown keys and malformed thresholds are load-time errors.
    pub fn parse(raw: &str) -> RewardResult<Self> {
        let (key, value) = raw.rsplit_once('_').ok_or_else(|| {
            RewardError::InvalidCondition { raw: raw.to_string() }
        })?;
        let threshold: i64 = value.parse().map_err(|_| {
            RewardError::InvalidCondition { raw: raw.to_string() }
        })?;
        match key {
            "daily"  => Ok(Self::DailyStreak { threshold }),
            "resume" => Ok(Self::ResumeScans { threshold }),
            _ => Err(RewardError::InvalidCondition { raw: raw.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeConfig {
    pub badge_id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i64,
    pub streak_freeze_reward: i64,
    pub condition: BadgeCondition,
}

#[derive(Debug, Clone, Deserialize)]
struct BadgeFileEntry {
    badge_id: String,
    name: String,
    description: String,
    icon: String,
    xp_reward: i64,
    #[serde(default)]
    streak_freeze_reward: i64,
    trigger_condition: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BadgeCatalogFile {
    badges: Vec<BadgeFileEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Standard,
    Flip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    pub action: TaskAction,
    pub target: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    pub challenge_id: ChallengeId,
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    pub xp_reward: i64,
    pub active: bool,
    #[serde(default)]
    pub tasks: Option<Vec<TaskConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChallengeCatalogFile {
    challenges: Vec<ChallengeConfig>,
}

#[derive(Debug, Clone)]
pub struct RewardConfig {
    pub badges: HashMap<BadgeId, BadgeConfig>,
    pub challenges: HashMap<ChallengeId, ChallengeConfig>,
}

impl RewardConfig {
    /// Load from the data/ directory.
    /// In tests, use RewardConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let badge_path = format!("{data_dir}/badges/badge_catalog.json");
        let badge_content = std::fs::read_to_string(&badge_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {badge_path}: {e}"))?;
        let badge_file: BadgeCatalogFile = serde_json::from_str(&badge_content)?;
        let mut badges = HashMap::new();
        for entry in badge_file.badges {
            let condition = BadgeCondition::parse(&entry.trigger_condition)
                .map_err(|e| anyhow::anyhow!("Badge '{}': {e}", entry.badge_id))?;
            badges.insert(
                entry.badge_id.clone(),
                BadgeConfig {
                    badge_id: entry.badge_id,
                    name: entry.name,
                    description: entry.description,
                    icon: entry.icon,
                    xp_reward: entry.xp_reward,
                    streak_freeze_reward: entry.streak_freeze_reward,
                    condition,
                },
            );
        }

        let challenge_path = format!("{data_dir}/challenges/challenge_catalog.json");
        let challenge_content = std::fs::read_to_string(&challenge_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {challenge_path}: {e}"))?;
        let challenge_file: ChallengeCatalogFile = serde_json::from_str(&challenge_content)?;
        let challenges = challenge_file
            .challenges
            .into_iter()
            .map(|c| (c.challenge_id.clone(), c))
            .collect();

        Ok(Self { badges, challenges })
    }

    /// Catalog with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        let badges = [
            BadgeConfig {
                badge_id: "badge-first-scan".into(),
                name: "First Scan".into(),
                description: "Analyzed your first resume".into(),
                icon: "scan".into(),
                xp_reward: 25,
                streak_freeze_reward: 0,
                condition: BadgeCondition::ResumeScans { threshold: 1 },
            },
            BadgeConfig {
                badge_id: "badge-resume-pro".into(),
                name: "Resume Pro".into(),
                description: "Analyzed five resumes".into(),
                icon: "medal".into(),
                xp_reward: 100,
                streak_freeze_reward: 0,
                condition: BadgeCondition::ResumeScans { threshold: 5 },
            },
            BadgeConfig {
                badge_id: "badge-streak-3".into(),
                name: "Warming Up".into(),
                description: "Three-day activity streak".into(),
                icon: "flame".into(),
                xp_reward: 50,
                streak_freeze_reward: 1,
                condition: BadgeCondition::DailyStreak { threshold: 3 },
            },
            BadgeConfig {
                badge_id: "badge-streak-7".into(),
                name: "On Fire".into(),
                description: "Seven-day activity streak".into(),
                icon: "bonfire".into(),
                xp_reward: 150,
                streak_freeze_reward: 2,
                condition: BadgeCondition::DailyStreak { threshold: 7 },
            },
        ]
        .into_iter()
        .map(|b| (b.badge_id.clone(), b))
        .collect();

        let challenges = [
            ChallengeConfig {
                challenge_id: "ch-career-sprint".into(),
                challenge_type: ChallengeType::Flip,
                title: "Career Sprint".into(),
                description: "Sharpen your resume and get applications out".into(),
                xp_reward: 120,
                active: true,
                tasks: Some(vec![
                    TaskConfig {
                        description: "Analyze a resume".into(),
                        action: TaskAction::AnalyzeResume,
                        target: 3,
                    },
                    TaskConfig {
                        description: "Track five job applications".into(),
                        action: TaskAction::AddJobApplication,
                        target: 5,
                    },
                ]),
            },
            ChallengeConfig {
                challenge_id: "ch-community-week".into(),
                challenge_type: ChallengeType::Flip,
                title: "Community Week".into(),
                description: "Show up in the community feed".into(),
                xp_reward: 80,
                active: true,
                tasks: Some(vec![
                    TaskConfig {
                        description: "Publish a community post".into(),
                        action: TaskAction::CommunityPost,
                        target: 1,
                    },
                    TaskConfig {
                        description: "Leave three comments".into(),
                        action: TaskAction::CommunityComment,
                        target: 3,
                    },
                ]),
            },
            ChallengeConfig {
                challenge_id: "ch-network-builder".into(),
                challenge_type: ChallengeType::Flip,
                title: "Network Builder".into(),
                description: "Grow the network and book a session".into(),
                xp_reward: 150,
                active: true,
                tasks: Some(vec![
                    TaskConfig {
                        description: "Refer a friend".into(),
                        action: TaskAction::Refer,
                        target: 1,
                    },
                    TaskConfig {
                        description: "Book a mock interview".into(),
                        action: TaskAction::BookAppointment,
                        target: 1,
                    },
                ]),
            },
            ChallengeConfig {
                challenge_id: "ch-login-month".into(),
                challenge_type: ChallengeType::Standard,
                title: "Habit Builder".into(),
                description: "Log in every day for a month".into(),
                xp_reward: 300,
                active: true,
                tasks: None,
            },
        ]
        .into_iter()
        .map(|c| (c.challenge_id.clone(), c))
        .collect();

        Self { badges, challenges }
    }
}
