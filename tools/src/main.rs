//! reward-runner: headless scenario runner for the Elevate reward engine.
//!
//! Seeds a tenant with a handful of users, drives a scripted number of
//! days of user activity through the engine, and prints an end-of-run
//! summary of XP, coins, badges, and completed challenges.
//!
//! Usage:
//!   reward-runner --seed 12345 --days 14 --users 5 --db run.db
//!   reward-runner --data-dir ./data --json

use anyhow::Result;
use chrono::{Duration, Utc};
use elevate_core::{engine::RewardEngine, ledger};

#[derive(serde::Serialize)]
struct UserSummary {
    user_id: String,
    xp_points: i64,
    coins: i64,
    daily_streak: i64,
    streak_freezes: i64,
    badges: i64,
    challenges_completed: i64,
    recent_activity: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 14u64);
    let users = parse_arg(&args, "--users", 5u64);
    let json_mode = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !json_mode {
        println!("Elevate — reward-runner");
        println!("  seed:     {seed}");
        println!("  days:     {days}");
        println!("  users:    {users}");
        println!("  db:       {db}");
        println!("  data_dir: {data_dir}");
        println!();
    }

    let engine = RewardEngine::build(data_dir, db, seed)?;

    // The whole scenario is replayed against wall-clock history so every
    // day of activity lands on a distinct calendar day.
    let start = Utc::now() - Duration::days(days as i64);

    engine.register_tenant("tenant-demo", "Demo Alumni Network", start)?;
    engine.store().insert_promo_code("WELCOME50", 50, start)?;

    let user_ids: Vec<String> = (0..users).map(|i| format!("user-{i:02}")).collect();
    for (i, user_id) in user_ids.iter().enumerate() {
        engine.register_user(
            user_id,
            "tenant-demo",
            &format!("Demo User {i}"),
            &format!("user{i}@example.org"),
            start,
        )?;
        // Opening the wallet page is part of onboarding; this is what
        // creates the wallet and seeds the starting bonus.
        engine.wallet(user_id, start)?;
        let _ = engine.dynamic_flip_challenge(user_id, start)?;
    }

    for day in 0..days {
        let now = start + Duration::days(day as i64) + Duration::hours(12);
        for (i, user_id) in user_ids.iter().enumerate() {
            // Staggered habits: everyone scans early on, then users drift
            // into different features depending on their index.
            if day < 3 || (day + i as u64) % 2 == 0 {
                engine.record_resume_scan(user_id, "resume.pdf", Some(72.5), now)?;
            }
            if (day + i as u64) % 3 == 0 {
                engine.record_job_application(user_id, "Initech", "Platform Engineer", now)?;
            }
            if i % 2 == 0 {
                let post_id = engine.record_community_post(user_id, "Career update!", now)?;
                for commenter in user_ids.iter().filter(|u| *u != user_id).take(2) {
                    engine.record_community_comment(commenter, &post_id, "Congrats!", now)?;
                }
            }
            if day == 1 {
                let referral_id =
                    engine.record_referral(user_id, &format!("friend{i}@example.org"), now)?;
                engine.record_referral_signup(&referral_id, user_id, now)?;
                engine.record_appointment(
                    user_id,
                    "mentor-01",
                    "mock_interview",
                    now + Duration::days(2),
                    now,
                )?;
            }
            if day == 2 && i == 0 {
                engine.redeem_promo_code(user_id, "WELCOME50", now)?;
            }
        }
        log::info!("day {day} complete");
    }

    let end = start + Duration::days(days as i64);
    let mut summaries = Vec::new();
    for user_id in &user_ids {
        let user = engine.store().require_user(user_id)?;
        let wallet = ledger::wallet(engine.store(), user_id, end)?;
        summaries.push(UserSummary {
            user_id: user_id.clone(),
            xp_points: user.xp_points,
            coins: wallet.wallet.coins,
            daily_streak: user.daily_streak,
            streak_freezes: user.streak_freezes,
            badges: engine.store().badge_award_count(user_id)?,
            challenges_completed: engine.store().challenge_completion_count(user_id)?,
            recent_activity: engine.store().latest_activity_descriptions(user_id, 3)?,
        });
    }

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("── Summary after {days} days ─────────────────────────");
        for s in &summaries {
            println!(
                "{}: {} XP, {} coins, streak {}, {} badge(s), {} challenge(s) done",
                s.user_id, s.xp_points, s.coins, s.daily_streak, s.badges, s.challenges_completed
            );
            for line in &s.recent_activity {
                println!("    · {line}");
            }
        }
    }

    Ok(())
}

fn parse_arg(args: &[String], flag: &str, default: u64) -> u64 {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
