//! The module contains the `BankAccount` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money};

/// A charity bank account.
///
/// The balance is owned exclusively by the ledger: it only moves through
/// [`credit`](crate::ledger::credit) / [`debit`](crate::ledger::debit), and
/// at all times equals the sum of credits minus the sum of debits recorded
/// against the account. Renames never touch it.
///
/// Accounts are never physically deleted; deactivation is a soft flag and
/// is only allowed once the balance is back to zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankAccount {
    /// Stable identifier, generated once and persisted, so the account can
    /// be renamed without breaking ledger references.
    pub id: Uuid,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub balance: Money,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl BankAccount {
    pub fn new(bank_name: String, account_name: String, account_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            bank_name,
            account_name,
            account_number,
            balance: Money::ZERO,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub balance_minor: i64,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerTransactions,
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankAccount> for ActiveModel {
    fn from(value: &BankAccount) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            bank_name: ActiveValue::Set(value.bank_name.clone()),
            account_name: ActiveValue::Set(value.account_name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            balance_minor: ActiveValue::Set(value.balance.minor()),
            active: ActiveValue::Set(value.active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::InvalidAmount("invalid account id".to_string()))?;
        Ok(Self {
            id,
            bank_name: value.bank_name,
            account_name: value.account_name,
            account_number: value.account_number,
            balance: Money::new(value.balance_minor),
            active: value.active,
            created_at: value.created_at,
        })
    }
}
