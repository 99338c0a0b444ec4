use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("recipient address is required")]
    MissingRecipient,

    #[error("recipient address is invalid: {0}")]
    InvalidRecipient(String),

    #[error("amount is required")]
    MissingAmount,

    #[error("amount is not a number: {0}")]
    NotANumber(String),

    #[error("amount {amount} is below the minimum {min}")]
    BelowMinimum { amount: String, min: f64 },

    #[error("amount {amount} is above the maximum {max}")]
    AboveMaximum { amount: String, max: f64 },

    #[error("amount {amount} exceeds wallet balance {balance}")]
    InsufficientBalance { amount: String, balance: String },

    #[error("wallet is not connected")]
    WalletNotConnected,

    #[error("message is longer than {max} characters")]
    MessageTooLong { max: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TipError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration missing: {}", .0.join(", "))]
    ConfigMissing(Vec<String>),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("wallet error: {0}")]
    Wallet(String),
}

pub type TipResult<T> = Result<T, TipError>;
