//! elevate-core — gamification reward engine for the Elevate alumni
//! career platform.
//!
//! The engine sits behind every counter-moving feature action (resume
//! scans, job applications, community posts and comments, referrals,
//! appointments, surveys, promo redemptions) and issues rewards:
//! flip-challenge XP, badges, wallet coins, and streak freezes.
//!
//! Layering, leaf to root:
//!   - store:     SQLite persistence (the only module that executes SQL)
//!   - counters:  read-through counter aggregation over store records
//!   - ledger:    wallet + XP mutation and the reward event journal
//!   - challenge: flip-challenge assignment
//!   - progress:  challenge completion evaluation
//!   - badge:     badge condition evaluation and award issuance
//!   - engine:    the composition root feature actions call into

pub mod badge;
pub mod challenge;
pub mod config;
pub mod counters;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod progress;
pub mod rng;
pub mod store;
pub mod streak;
pub mod types;
