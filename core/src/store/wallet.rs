//! Wallet and wallet-transaction database queries.

use super::{parse_utc, RewardStore};
use crate::error::RewardResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct WalletRecord {
    pub user_id: String,
    pub coins: i64,
    pub flash_coins: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletTxnRecord {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub amount: i64,
    pub txn_type: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWalletTxn<'a> {
    pub user_id: &'a str,
    pub description: &'a str,
    pub amount: i64,
    pub txn_type: &'a str, // 'credit' | 'debit'
    pub currency: &'a str, // 'coins' | 'xp'
    pub created_at: DateTime<Utc>,
}

impl RewardStore {
    /// Create the wallet row if it does not exist. Returns true when this
    /// call created it. INSERT OR IGNORE makes concurrent first access
    /// idempotent: the loser of the race sees false and skips the bonus.
    pub fn insert_wallet_if_absent(
        &self,
        user_id: &str,
        starting_coins: i64,
        now: DateTime<Utc>,
    ) -> RewardResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO wallet (user_id, coins, flash_coins, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![user_id, starting_coins, now.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_wallet(&self, user_id: &str) -> RewardResult<Option<WalletRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, coins, flash_coins, created_at
                 FROM wallet WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((user_id, coins, flash_coins, created_at)) => Ok(Some(WalletRecord {
                user_id,
                coins,
                flash_coins,
                created_at: parse_utc(&created_at)?,
            })),
            None => Ok(None),
        }
    }

    pub fn set_wallet_balances(
        &self,
        user_id: &str,
        coins: i64,
        flash_coins: i64,
    ) -> RewardResult<()> {
        self.conn.execute(
            "UPDATE wallet SET coins = ?1, flash_coins = ?2 WHERE user_id = ?3",
            params![coins, flash_coins, user_id],
        )?;
        Ok(())
    }

    pub fn insert_wallet_txn(&self, txn: &NewWalletTxn) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO wallet_txn (user_id, description, amount, txn_type, currency, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.user_id,
                txn.description,
                txn.amount,
                txn.txn_type,
                txn.currency,
                txn.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The user's most recent transactions, newest first.
    pub fn recent_wallet_txns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> RewardResult<Vec<WalletTxnRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, description, amount, txn_type, currency, created_at
             FROM wallet_txn WHERE user_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, user_id, description, amount, txn_type, currency, created_at)| {
                Ok(WalletTxnRecord {
                    id,
                    user_id,
                    description,
                    amount,
                    txn_type,
                    currency,
                    created_at: parse_utc(&created_at)?,
                })
            })
            .collect()
    }

    pub fn wallet_txn_count(&self, user_id: &str, currency: &str) -> RewardResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM wallet_txn WHERE user_id = ?1 AND currency = ?2",
                params![user_id, currency],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
