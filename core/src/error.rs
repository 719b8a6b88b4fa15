use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewardError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User '{user_id}' not found")]
    UserNotFound { user_id: String },

    #[error("No wallet exists for user '{user_id}'")]
    WalletNotFound { user_id: String },

    #[error("Invalid badge trigger condition '{raw}'")]
    InvalidCondition { raw: String },

    #[error("Promo code '{code}' not found or inactive")]
    PromoNotFound { code: String },

    #[error("Promo code '{code}' already redeemed")]
    PromoAlreadyRedeemed { code: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RewardResult<T> = Result<T, RewardError>;
