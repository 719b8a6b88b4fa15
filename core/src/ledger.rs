//! The reward ledger — wallet bootstrap, coin balance updates, XP grants.
//!
//! RULE: All balance mutation goes through this module. The wallet's coin
//! balance always equals the sum of its 'coins' transactions since
//! creation; callers of update_wallet pass the intended FINAL balance,
//! not a delta, and the ledger derives the delta transaction itself.

use crate::{
    error::{RewardError, RewardResult},
    event::{event_type_name, EventLogEntry, RewardEvent},
    store::{NewWalletTxn, RewardStore, UserRecord, WalletRecord, WalletTxnRecord},
};
use chrono::{DateTime, Utc};

/// Coins seeded into every freshly created wallet.
pub const STARTING_COINS: i64 = 100;
/// How many transactions a wallet read returns.
pub const RECENT_TXN_LIMIT: usize = 50;

const BOOTSTRAP_DESCRIPTION: &str = "Initial account bonus";

#[derive(Debug, Clone)]
pub struct WalletSummary {
    pub wallet: WalletRecord,
    /// Most recent transactions, newest first.
    pub transactions: Vec<WalletTxnRecord>,
}

/// Return the user's wallet, creating it on first access with the starting
/// bonus and one seed transaction.
pub fn wallet(
    store: &RewardStore,
    user_id: &str,
    now: DateTime<Utc>,
) -> RewardResult<WalletSummary> {
    if store.insert_wallet_if_absent(user_id, STARTING_COINS, now)? {
        store.insert_wallet_txn(&NewWalletTxn {
            user_id,
            description: BOOTSTRAP_DESCRIPTION,
            amount: STARTING_COINS,
            txn_type: "credit",
            currency: "coins",
            created_at: now,
        })?;
        journal(
            store,
            user_id,
            "ledger",
            &RewardEvent::WalletCreated {
                user_id: user_id.to_string(),
                starting_coins: STARTING_COINS,
            },
            now,
        )?;
        log::info!("user={user_id} ledger: wallet created with {STARTING_COINS} starting coins");
    }

    let wallet = store
        .get_wallet(user_id)?
        .ok_or_else(|| RewardError::WalletNotFound {
            user_id: user_id.to_string(),
        })?;
    let transactions = store.recent_wallet_txns(user_id, RECENT_TXN_LIMIT)?;
    Ok(WalletSummary {
        wallet,
        transactions,
    })
}

/// Set the wallet's balances to the given absolute values. A transaction
/// is recorded only when the coin delta is nonzero AND a description was
/// supplied. Creates the wallet first if the user never opened one.
pub fn update_wallet(
    store: &RewardStore,
    user_id: &str,
    coins: Option<i64>,
    flash_coins: Option<i64>,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> RewardResult<WalletRecord> {
    let existing = match store.get_wallet(user_id)? {
        Some(w) => w,
        None => wallet(store, user_id, now)?.wallet,
    };

    let new_coins = coins.unwrap_or(existing.coins);
    let new_flash = flash_coins.unwrap_or(existing.flash_coins);
    store.set_wallet_balances(user_id, new_coins, new_flash)?;

    let delta = new_coins - existing.coins;
    if delta != 0 {
        if let Some(description) = description {
            store.insert_wallet_txn(&NewWalletTxn {
                user_id,
                description,
                amount: delta,
                txn_type: if delta > 0 { "credit" } else { "debit" },
                currency: "coins",
                created_at: now,
            })?;
            journal(
                store,
                user_id,
                "ledger",
                &RewardEvent::CoinsAdjusted {
                    user_id: user_id.to_string(),
                    old_coins: existing.coins,
                    new_coins,
                },
                now,
            )?;
        }
    }

    store
        .get_wallet(user_id)?
        .ok_or_else(|| RewardError::WalletNotFound {
            user_id: user_id.to_string(),
        })
}

/// Credit XP to the user and append a matching ledger transaction.
/// Amounts <= 0 are a no-op returning None. The user AND the wallet must
/// already exist; absence is a typed error for the caller to handle.
pub fn add_xp(
    store: &RewardStore,
    user_id: &str,
    amount: i64,
    description: &str,
    now: DateTime<Utc>,
) -> RewardResult<Option<UserRecord>> {
    if amount <= 0 {
        return Ok(None);
    }

    store.require_user(user_id)?;
    if store.get_wallet(user_id)?.is_none() {
        return Err(RewardError::WalletNotFound {
            user_id: user_id.to_string(),
        });
    }

    store.add_user_xp(user_id, amount)?;
    store.insert_wallet_txn(&NewWalletTxn {
        user_id,
        description,
        amount,
        txn_type: "credit",
        currency: "xp",
        created_at: now,
    })?;
    journal(
        store,
        user_id,
        "ledger",
        &RewardEvent::XpGranted {
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
        },
        now,
    )?;
    log::debug!("user={user_id} ledger: +{amount} XP ({description})");

    store.require_user(user_id).map(Some)
}

/// Serialize an event and append it to the journal.
pub(crate) fn journal(
    store: &RewardStore,
    user_id: &str,
    source: &str,
    event: &RewardEvent,
    now: DateTime<Utc>,
) -> RewardResult<()> {
    store.append_event(&EventLogEntry {
        id: None,
        user_id: user_id.to_string(),
        source: source.to_string(),
        event_type: event_type_name(event).to_string(),
        payload: serde_json::to_string(event)?,
        created_at: now,
    })
}
