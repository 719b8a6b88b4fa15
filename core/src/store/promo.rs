//! Promo-code database queries.
//!
//! Redemption runs inside an explicit transaction: the redemption record,
//! the balance update, and the ledger entry land together or not at all.
//! This is deliberately stricter than the reward path, which is
//! best-effort by design.

use super::RewardStore;
use crate::error::{RewardError, RewardResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

impl RewardStore {
    pub fn insert_promo_code(
        &self,
        code: &str,
        coin_reward: i64,
        now: DateTime<Utc>,
    ) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO promo_code (code, coin_reward, active, created_at)
             VALUES (?1, ?2, 1, ?3)",
            params![code, coin_reward, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Redeem a promo code for a user. Returns the coins credited.
    pub fn redeem_promo_code(
        &self,
        user_id: &str,
        code: &str,
        starting_coins: i64,
        now: DateTime<Utc>,
    ) -> RewardResult<i64> {
        let tx = self.conn.unchecked_transaction()?;

        let coin_reward: Option<i64> = tx
            .query_row(
                "SELECT coin_reward FROM promo_code WHERE code = ?1 AND active = 1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        let coin_reward = coin_reward.ok_or_else(|| RewardError::PromoNotFound {
            code: code.to_string(),
        })?;

        let redeemed = tx.execute(
            "INSERT OR IGNORE INTO promo_redemption (code, user_id, redeemed_at)
             VALUES (?1, ?2, ?3)",
            params![code, user_id, now.to_rfc3339()],
        )?;
        if redeemed == 0 {
            return Err(RewardError::PromoAlreadyRedeemed {
                code: code.to_string(),
            });
        }

        // Bootstrap the wallet if the user never opened one, then credit.
        let created = tx.execute(
            "INSERT OR IGNORE INTO wallet (user_id, coins, flash_coins, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![user_id, starting_coins, now.to_rfc3339()],
        )?;
        if created > 0 {
            tx.execute(
                "INSERT INTO wallet_txn (user_id, description, amount, txn_type, currency, created_at)
                 VALUES (?1, 'Initial account bonus', ?2, 'credit', 'coins', ?3)",
                params![user_id, starting_coins, now.to_rfc3339()],
            )?;
        }
        tx.execute(
            "UPDATE wallet SET coins = coins + ?1 WHERE user_id = ?2",
            params![coin_reward, user_id],
        )?;
        tx.execute(
            "INSERT INTO wallet_txn (user_id, description, amount, txn_type, currency, created_at)
             VALUES (?1, ?2, ?3, 'credit', 'coins', ?4)",
            params![
                user_id,
                format!("Promo code {code}"),
                coin_reward,
                now.to_rfc3339()
            ],
        )?;

        tx.commit()?;
        Ok(coin_reward)
    }
}
