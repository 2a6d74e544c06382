//! Donor registry and derived aggregate stats.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, donations};

/// A donor.
///
/// `total_donations` and `last_donation_date` are derived values: they are
/// recomputed in full from the live (non-deleted) donations whenever a
/// donation tied to this donor is created, updated or deleted. Full
/// recomputation stays correct under arbitrary edits, which incremental
/// maintenance would have to handle path by path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub total_donations: Money,
    pub last_donation_date: Option<NaiveDate>,
}

impl Donor {
    pub fn new(name: String, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            phone,
            total_donations: Money::ZERO,
            last_donation_date: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "donors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub total_donations_minor: i64,
    pub last_donation_date: Option<Date>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::donations::Entity")]
    Donations,
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Donor> for ActiveModel {
    fn from(value: &Donor) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            total_donations_minor: ActiveValue::Set(value.total_donations.minor()),
            last_donation_date: ActiveValue::Set(value.last_donation_date),
            is_deleted: ActiveValue::Set(false),
        }
    }
}

impl TryFrom<Model> for Donor {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::InvalidAmount("invalid donor id".to_string()))?;
        Ok(Self {
            id,
            name: value.name,
            phone: value.phone,
            total_donations: Money::new(value.total_donations_minor),
            last_donation_date: value.last_donation_date,
        })
    }
}

/// Recomputes a donor's aggregate stats from the live donations and writes
/// them back to the donor row.
///
/// A no-op when the donor id does not resolve (a donation may point at a
/// donor deleted out of band; the mutation that called us is still valid).
pub(crate) async fn recompute_stats(db_tx: &DatabaseTransaction, donor_id: Uuid) -> ResultEngine<()> {
    let Some(donor) = Entity::find_by_id(donor_id.to_string()).one(db_tx).await? else {
        return Ok(());
    };

    let rows = donations::Entity::find()
        .filter(donations::Column::DonorId.eq(donor_id.to_string()))
        .filter(donations::Column::IsDeleted.eq(false))
        .all(db_tx)
        .await?;

    let total: i64 = rows.iter().map(|d| d.amount_minor).sum();
    let last = rows.iter().map(|d| d.date).max();

    let update = ActiveModel {
        id: ActiveValue::Set(donor.id),
        total_donations_minor: ActiveValue::Set(total),
        last_donation_date: ActiveValue::Set(last),
        ..Default::default()
    };
    update.update(db_tx).await?;
    Ok(())
}
