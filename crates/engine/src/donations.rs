//! Donations and receipt numbering.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    /// Receipt number, e.g. `DON-2026-001`. Unique, allocated sequentially
    /// per creation year.
    pub receipt_no: String,
    pub donor_id: Uuid,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Money,
    pub payment_method: String,
    /// `None` means the donation has not been banked (e.g. cash in hand).
    /// Only banked donations touch the ledger.
    pub bank_id: Option<Uuid>,
    pub remarks: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub receipt_no: String,
    pub donor_id: String,
    pub date: Date,
    pub category: String,
    pub amount_minor: i64,
    pub payment_method: String,
    pub bank_id: Option<String>,
    pub remarks: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donors::Entity",
        from = "Column::DonorId",
        to = "super::donors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Donors,
}

impl Related<super::donors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Donation> for ActiveModel {
    fn from(value: &Donation) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            receipt_no: ActiveValue::Set(value.receipt_no.clone()),
            donor_id: ActiveValue::Set(value.donor_id.to_string()),
            date: ActiveValue::Set(value.date),
            category: ActiveValue::Set(value.category.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            payment_method: ActiveValue::Set(value.payment_method.clone()),
            bank_id: ActiveValue::Set(value.bank_id.map(|id| id.to_string())),
            remarks: ActiveValue::Set(value.remarks.clone()),
            is_deleted: ActiveValue::Set(value.is_deleted),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Donation {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let invalid = |what: &str| EngineError::InvalidAmount(format!("invalid {what}"));
        let bank_id = match value.bank_id {
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| invalid("bank id"))?),
            None => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&value.id).map_err(|_| invalid("donation id"))?,
            receipt_no: value.receipt_no,
            donor_id: Uuid::parse_str(&value.donor_id).map_err(|_| invalid("donor id"))?,
            date: value.date,
            category: value.category,
            amount: Money::new(value.amount_minor),
            payment_method: value.payment_method,
            bank_id,
            remarks: value.remarks,
            is_deleted: value.is_deleted,
            created_at: value.created_at,
        })
    }
}

/// Allocates the next receipt number for the current year.
///
/// The sequence derives from the max existing sequence for the year's
/// prefix, not from a row count, so deletions never shrink it. Soft-deleted
/// donations keep their receipt number and stay in the scan: a deleted
/// `DON-2026-007` still blocks `007` from being issued again.
pub(crate) async fn next_receipt_no(db_tx: &DatabaseTransaction) -> ResultEngine<String> {
    let year = Utc::now().year();
    let prefix = format!("DON-{year}-");

    let existing = Entity::find()
        .filter(Column::ReceiptNo.starts_with(&prefix))
        .all(db_tx)
        .await?;

    let max_seq = existing
        .iter()
        .filter_map(|d| d.receipt_no.strip_prefix(&prefix))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    Ok(format!("{prefix}{:03}", max_seq + 1))
}
