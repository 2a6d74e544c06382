//! The module contains the errors the engine can throw.
//!
//! All ledger errors are terminal domain errors, not transient faults: the
//! engine never retries, it rolls the operation back and reports. Each
//! variant carries a stable machine-readable [`code`](EngineError::code)
//! that survives to the wire unchanged so clients can render a precise
//! message.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A bank account id does not resolve.
    #[error("bank account \"{0}\" not found")]
    BankNotFound(String),
    /// Credit or debit attempted on a deactivated account.
    #[error("bank account \"{0}\" is inactive")]
    BankInactive(String),
    /// A debit would drive the account balance negative.
    #[error("insufficient balance: {0}")]
    InsufficientFunds(String),
    /// A donor id does not resolve.
    #[error("donor \"{0}\" not found")]
    DonorNotFound(String),
    /// A donation or expense id does not resolve.
    #[error("\"{0}\" not found")]
    NotFound(String),
    /// An active account with the same bank + account number already exists.
    #[error("account \"{0}\" already present")]
    AccountExists(String),
    /// Deactivation attempted while the account still holds money.
    #[error("account \"{0}\" balance is not zero")]
    BalanceNotZero(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Machine-readable error code carried in API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BankNotFound(_) => "BANK_NOT_FOUND",
            Self::BankInactive(_) => "BANK_INACTIVE",
            Self::InsufficientFunds(_) => "INSUFFICIENT_BALANCE",
            Self::DonorNotFound(_) => "DONOR_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AccountExists(_) => "ACCOUNT_EXISTS",
            Self::BalanceNotZero(_) => "BALANCE_NOT_ZERO",
            Self::InvalidAmount(_) => "VALIDATION_ERROR",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BankNotFound(a), Self::BankNotFound(b)) => a == b,
            (Self::BankInactive(a), Self::BankInactive(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::DonorNotFound(a), Self::DonorNotFound(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::AccountExists(a), Self::AccountExists(b)) => a == b,
            (Self::BalanceNotZero(a), Self::BalanceNotZero(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
