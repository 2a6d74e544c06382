use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error payload returned by every endpoint on failure.
///
/// `code` is machine-readable and stable (`BANK_NOT_FOUND`,
/// `INSUFFICIENT_BALANCE`, ...); `message` is for humans.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub mod bank {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankNew {
        pub bank_name: String,
        pub account_name: String,
        pub account_number: String,
    }

    /// Administrative rename; never touches the balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankRename {
        pub bank_name: Option<String>,
        pub account_name: Option<String>,
        pub account_number: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankView {
        pub id: Uuid,
        pub bank_name: String,
        pub account_name: String,
        pub account_number: String,
        /// Current balance in paisa.
        pub balance_minor: i64,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankList {
        pub banks: Vec<BankView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatementQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        /// `credit` or `debit`.
        pub direction: String,
        pub amount_minor: i64,
        /// `donation` or `expense`.
        pub origin_kind: String,
        pub origin_id: Uuid,
        pub occurred_at: DateTime<Utc>,
        pub remark: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatementResponse {
        pub transactions: Vec<LedgerEntryView>,
    }
}

pub mod donor {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonorNew {
        pub name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonorCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonorView {
        pub id: Uuid,
        pub name: String,
        pub phone: Option<String>,
        /// Sum of the donor's live donations, in paisa. Derived.
        pub total_donations_minor: i64,
        pub last_donation_date: Option<NaiveDate>,
    }
}

pub mod donation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationNew {
        pub donor_id: Uuid,
        pub date: NaiveDate,
        pub category: String,
        pub amount_minor: i64,
        pub payment_method: String,
        /// Omit for a donation not (yet) banked.
        pub bank_id: Option<Uuid>,
        pub remarks: Option<String>,
    }

    /// Partial update; omitted fields are left unchanged.
    ///
    /// `bank_id` uses a double option: absent = unchanged, `null` = un-bank
    /// the donation.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DonationUpdate {
        pub donor_id: Option<Uuid>,
        pub date: Option<NaiveDate>,
        pub category: Option<String>,
        pub amount_minor: Option<i64>,
        pub payment_method: Option<String>,
        #[serde(default, with = "super::double_option")]
        pub bank_id: Option<Option<Uuid>>,
        pub remarks: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationView {
        pub id: Uuid,
        pub receipt_no: String,
        pub donor_id: Uuid,
        pub date: NaiveDate,
        pub category: String,
        pub amount_minor: i64,
        pub payment_method: String,
        pub bank_id: Option<Uuid>,
        pub remarks: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: NaiveDate,
        pub category: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        pub paid_from: Uuid,
    }

    /// Partial update; omitted fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub date: Option<NaiveDate>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub paid_from: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub category: String,
        pub description: String,
        pub amount_minor: i64,
        pub paid_from: Uuid,
        pub created_at: DateTime<Utc>,
    }
}

/// Distinguishes "field absent" from "field set to null" when deserializing
/// optional nullable fields.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
