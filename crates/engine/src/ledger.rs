//! Ledger primitives.
//!
//! A [`LedgerTransaction`] is an immutable record of one balance mutation on
//! a bank account: a credit (money in, e.g. a banked donation) or a debit
//! (money out, e.g. an expense). Rows are append-only; edits and deletions
//! of the originating domain object are expressed as *new* reversing rows,
//! never as updates to old ones.
//!
//! In the engine, *every* change to an account balance happens through
//! [`credit`] / [`debit`], which update the balance and append the ledger
//! row on the same database transaction.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, banks};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid ledger direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    Donation,
    Expense,
}

impl OriginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for OriginKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "donation" => Ok(Self::Donation),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid origin kind: {other}"
            ))),
        }
    }
}

/// The domain object a ledger row exists for, kept for audit and
/// reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub kind: OriginKind,
    pub id: Uuid,
}

impl Origin {
    pub fn donation(id: Uuid) -> Self {
        Self {
            kind: OriginKind::Donation,
            id,
        }
    }

    pub fn expense(id: Uuid) -> Self {
        Self {
            kind: OriginKind::Expense,
            id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount: Money,
    pub origin: Origin,
    pub occurred_at: DateTime<Utc>,
    pub remark: String,
}

impl LedgerTransaction {
    pub fn new(
        account_id: Uuid,
        direction: Direction,
        amount: Money,
        origin: Origin,
        remark: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            direction,
            amount,
            origin,
            occurred_at: Utc::now(),
            remark,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub direction: String,
    pub amount_minor: i64,
    pub origin_kind: String,
    pub origin_id: String,
    pub occurred_at: DateTimeUtc,
    pub remark: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::banks::Entity",
        from = "Column::AccountId",
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

impl From<&LedgerTransaction> for ActiveModel {
    fn from(value: &LedgerTransaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            direction: ActiveValue::Set(value.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            origin_kind: ActiveValue::Set(value.origin.kind.as_str().to_string()),
            origin_id: ActiveValue::Set(value.origin.id.to_string()),
            occurred_at: ActiveValue::Set(value.occurred_at),
            remark: ActiveValue::Set(value.remark.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerTransaction {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let invalid = |what: &str| EngineError::InvalidAmount(format!("invalid {what}"));
        Ok(Self {
            id: Uuid::parse_str(&value.id).map_err(|_| invalid("ledger id"))?,
            account_id: Uuid::parse_str(&value.account_id).map_err(|_| invalid("account id"))?,
            direction: Direction::try_from(value.direction.as_str())?,
            amount: Money::new(value.amount_minor),
            origin: Origin {
                kind: OriginKind::try_from(value.origin_kind.as_str())?,
                id: Uuid::parse_str(&value.origin_id).map_err(|_| invalid("origin id"))?,
            },
            occurred_at: value.occurred_at,
            remark: value.remark,
        })
    }
}

async fn load_active_account(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
) -> ResultEngine<banks::Model> {
    let account = banks::Entity::find_by_id(account_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::BankNotFound(account_id.to_string()))?;
    if !account.active {
        return Err(EngineError::BankInactive(account_id.to_string()));
    }
    Ok(account)
}

async fn apply(
    db_tx: &DatabaseTransaction,
    account: banks::Model,
    new_balance_minor: i64,
    row: &LedgerTransaction,
) -> ResultEngine<Uuid> {
    let account_update = banks::ActiveModel {
        id: ActiveValue::Set(account.id),
        balance_minor: ActiveValue::Set(new_balance_minor),
        ..Default::default()
    };
    account_update.update(db_tx).await?;

    ActiveModel::from(row).insert(db_tx).await?;
    Ok(row.id)
}

/// Credits `amount` to an account and appends the matching ledger row.
///
/// Both halves ride on `db_tx`: if the caller's transaction does not commit,
/// neither the balance change nor the ledger row persists.
pub(crate) async fn credit(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    amount: Money,
    origin: Origin,
    remark: &str,
) -> ResultEngine<Uuid> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "credit amount must be > 0, got {amount}"
        )));
    }

    let account = load_active_account(db_tx, account_id).await?;
    let new_balance = Money::new(account.balance_minor)
        .checked_add(amount)
        .ok_or_else(|| {
            EngineError::InvalidAmount(format!(
                "crediting {amount} to account {account_id} would overflow the balance"
            ))
        })?;

    let row = LedgerTransaction::new(
        account_id,
        Direction::Credit,
        amount,
        origin,
        remark.to_string(),
    );
    apply(db_tx, account, new_balance.minor(), &row).await
}

/// Debits `amount` from an account and appends the matching ledger row.
///
/// Fails with [`EngineError::InsufficientFunds`] when the balance would go
/// negative; the account is left untouched.
pub(crate) async fn debit(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    amount: Money,
    origin: Origin,
    remark: &str,
) -> ResultEngine<Uuid> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "debit amount must be > 0, got {amount}"
        )));
    }

    let account = load_active_account(db_tx, account_id).await?;
    if account.balance_minor < amount.minor() {
        return Err(EngineError::InsufficientFunds(format!(
            "account {account_id} holds {}, cannot debit {amount}",
            Money::new(account.balance_minor)
        )));
    }
    let new_balance = Money::new(account.balance_minor)
        .checked_sub(amount)
        .ok_or_else(|| {
            EngineError::InvalidAmount(format!(
                "debiting {amount} from account {account_id} would overflow the balance"
            ))
        })?;

    let row = LedgerTransaction::new(
        account_id,
        Direction::Debit,
        amount,
        origin,
        remark.to_string(),
    );
    apply(db_tx, account, new_balance.minor(), &row).await
}
