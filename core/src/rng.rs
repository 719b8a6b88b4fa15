//! Deterministic random number generation.
//!
//! RULE: Nothing in the reward path may call a platform RNG.
//! All randomness flows through RewardRng streams derived from the
//! single master seed the engine was built with.
//!
//! Each user gets their own stream, seeded deterministically from
//! (master_seed XOR fold(user_id)). This means:
//!   - Two engines with the same seed pick the same flip tasks for a user.
//!   - One user's draws never perturb another user's stream.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream for a single user.
pub struct RewardRng {
    inner: Pcg64Mcg,
}

impl RewardRng {
    pub fn new(derived_seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Fisher–Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below((i + 1) as u64) as usize;
            items.swap(i, j);
        }
    }
}

/// Derives per-user RNG streams from the master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_user(&self, user_id: &str) -> RewardRng {
        RewardRng::new(self.master_seed ^ fold_key(user_id))
    }
}

/// FNV-1a fold of a string key into a u64. Stable across platforms and
/// releases, unlike the std hasher.
fn fold_key(key: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in key.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
