//! Expenses.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

/// An expense paid out of a bank account.
///
/// Unlike donations, the bank reference is mandatory: every expense is paid
/// from some account, so every live expense has exactly one matching debit
/// in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub paid_from: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: Date,
    pub category: String,
    pub description: String,
    pub amount_minor: i64,
    pub paid_from: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::banks::Entity",
        from = "Column::PaidFrom",
        to = "super::banks::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
}

impl Related<super::banks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(value: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            date: ActiveValue::Set(value.date),
            category: ActiveValue::Set(value.category.clone()),
            description: ActiveValue::Set(value.description.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            paid_from: ActiveValue::Set(value.paid_from.to_string()),
            is_deleted: ActiveValue::Set(value.is_deleted),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let invalid = |what: &str| EngineError::InvalidAmount(format!("invalid {what}"));
        Ok(Self {
            id: Uuid::parse_str(&value.id).map_err(|_| invalid("expense id"))?,
            date: value.date,
            category: value.category,
            description: value.description,
            amount: Money::new(value.amount_minor),
            paid_from: Uuid::parse_str(&value.paid_from).map_err(|_| invalid("account id"))?,
            is_deleted: value.is_deleted,
            created_at: value.created_at,
        })
    }
}
