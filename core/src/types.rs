//! Shared primitive types used across the whole platform core.

/// A stable, unique identifier for a user.
pub type UserId = String;

/// A stable, unique identifier for a tenant (one alumni network).
pub type TenantId = String;

/// Challenge identifier — a catalog id or a synthesized `dynamic-<millis>` id.
pub type ChallengeId = String;

/// Badge identifier from the badge catalog.
pub type BadgeId = String;
