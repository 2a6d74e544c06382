//! Charity back-office core: bank-account ledger plus the donation and
//! expense lifecycle coordinators that keep it consistent.
//!
//! Every lifecycle operation runs on a single database transaction: the
//! ledger mutation, the record mutation, and the donor-stat recomputation
//! either all persist or none do. Ledger failures (unknown account,
//! inactive account, insufficient balance) are terminal domain errors that
//! roll the whole operation back and surface to the caller with their code
//! intact.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

pub use banks::BankAccount;
pub use donations::Donation;
pub use donors::Donor;
pub use error::EngineError;
pub use expenses::Expense;
pub use ledger::{Direction, LedgerTransaction, Origin, OriginKind};
pub use money::Money;

mod banks;
mod donations;
mod donors;
mod error;
mod expenses;
mod ledger;
mod money;

type ResultEngine<T> = Result<T, EngineError>;

/// Command to create a donation.
#[derive(Clone, Debug)]
pub struct DonationNew {
    pub donor_id: Uuid,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Money,
    pub payment_method: String,
    /// `None` = not banked (e.g. cash still in hand); no ledger effect.
    pub bank_id: Option<Uuid>,
    pub remarks: Option<String>,
}

/// Partial update of a donation. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct DonationPatch {
    pub donor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub payment_method: Option<String>,
    /// Outer `None` = unchanged; `Some(None)` = un-bank the donation.
    pub bank_id: Option<Option<Uuid>>,
    pub remarks: Option<String>,
}

/// Command to create an expense.
#[derive(Clone, Debug)]
pub struct ExpenseNew {
    pub date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub paid_from: Uuid,
}

/// Partial update of an expense. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct ExpensePatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub paid_from: Option<Uuid>,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    // ── Ledger primitives ──

    /// Credits an account and appends the matching ledger row atomically.
    pub async fn credit(
        &self,
        account_id: Uuid,
        amount: Money,
        origin: Origin,
        remark: &str,
    ) -> ResultEngine<Uuid> {
        let db_tx = self.database.begin().await?;
        let id = ledger::credit(&db_tx, account_id, amount, origin, remark).await?;
        db_tx.commit().await?;
        Ok(id)
    }

    /// Debits an account and appends the matching ledger row atomically.
    ///
    /// Fails with [`EngineError::InsufficientFunds`] rather than letting the
    /// balance go negative.
    pub async fn debit(
        &self,
        account_id: Uuid,
        amount: Money,
        origin: Origin,
        remark: &str,
    ) -> ResultEngine<Uuid> {
        let db_tx = self.database.begin().await?;
        let id = ledger::debit(&db_tx, account_id, amount, origin, remark).await?;
        db_tx.commit().await?;
        Ok(id)
    }

    // ── Bank account administration ──

    /// Opens a new bank account with balance zero.
    ///
    /// The same bank + account number pair cannot exist twice among active
    /// accounts.
    pub async fn new_bank_account(
        &self,
        bank_name: &str,
        account_name: &str,
        account_number: &str,
    ) -> ResultEngine<BankAccount> {
        let db_tx = self.database.begin().await?;

        ensure_no_duplicate(&db_tx, bank_name, account_number, None).await?;

        let account = BankAccount::new(
            bank_name.to_string(),
            account_name.to_string(),
            account_number.to_string(),
        );
        banks::ActiveModel::from(&account).insert(&db_tx).await?;

        db_tx.commit().await?;
        Ok(account)
    }

    /// Administrative rename: bank name, account name and/or account number.
    /// Never touches the balance.
    pub async fn rename_account(
        &self,
        account_id: Uuid,
        bank_name: Option<&str>,
        account_name: Option<&str>,
        account_number: Option<&str>,
    ) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let model = banks::Entity::find_by_id(account_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::BankNotFound(account_id.to_string()))?;

        let new_bank_name = bank_name.unwrap_or(&model.bank_name);
        let new_account_number = account_number.unwrap_or(&model.account_number);
        if new_bank_name != model.bank_name || new_account_number != model.account_number {
            ensure_no_duplicate(&db_tx, new_bank_name, new_account_number, Some(&model.id)).await?;
        }

        let update = banks::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            bank_name: ActiveValue::Set(new_bank_name.to_string()),
            account_name: ActiveValue::Set(
                account_name.unwrap_or(&model.account_name).to_string(),
            ),
            account_number: ActiveValue::Set(new_account_number.to_string()),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Deactivates an account (soft; accounts are never physically deleted).
    ///
    /// Only allowed once the balance is back to zero.
    pub async fn deactivate_account(&self, account_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let model = banks::Entity::find_by_id(account_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::BankNotFound(account_id.to_string()))?;
        if model.balance_minor != 0 {
            return Err(EngineError::BalanceNotZero(account_id.to_string()));
        }

        let update = banks::ActiveModel {
            id: ActiveValue::Set(model.id),
            active: ActiveValue::Set(false),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Return a bank account.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<BankAccount> {
        let model = banks::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::BankNotFound(account_id.to_string()))?;
        BankAccount::try_from(model)
    }

    /// Lists active bank accounts, newest first.
    pub async fn active_accounts(&self) -> ResultEngine<Vec<BankAccount>> {
        let models = banks::Entity::find()
            .filter(banks::Column::Active.eq(true))
            .order_by_desc(banks::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(BankAccount::try_from).collect()
    }

    /// Lists an account's ledger transactions, newest first.
    pub async fn account_statement(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<LedgerTransaction>> {
        banks::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::BankNotFound(account_id.to_string()))?;

        let models = ledger::Entity::find()
            .filter(ledger::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(ledger::Column::OccurredAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(LedgerTransaction::try_from).collect()
    }

    // ── Donor registry ──

    /// Registers a donor.
    pub async fn new_donor(&self, name: &str, phone: Option<&str>) -> ResultEngine<Donor> {
        let donor = Donor::new(name.to_string(), phone.map(|p| p.to_string()));
        donors::ActiveModel::from(&donor).insert(&self.database).await?;
        Ok(donor)
    }

    /// Return a donor with its derived stats.
    pub async fn donor(&self, donor_id: Uuid) -> ResultEngine<Donor> {
        let model = donors::Entity::find_by_id(donor_id.to_string())
            .one(&self.database)
            .await?
            .filter(|d| !d.is_deleted)
            .ok_or_else(|| EngineError::DonorNotFound(donor_id.to_string()))?;
        Donor::try_from(model)
    }

    // ── Donation lifecycle ──

    /// Records a donation: allocates the receipt number, persists the
    /// record, credits the bank when banked, refreshes donor stats.
    pub async fn new_donation(&self, cmd: DonationNew) -> ResultEngine<Donation> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "donation amount must be > 0, got {}",
                cmd.amount
            )));
        }

        let db_tx = self.database.begin().await?;

        donors::Entity::find_by_id(cmd.donor_id.to_string())
            .one(&db_tx)
            .await?
            .filter(|d| !d.is_deleted)
            .ok_or_else(|| EngineError::DonorNotFound(cmd.donor_id.to_string()))?;

        let receipt_no = donations::next_receipt_no(&db_tx).await?;
        let donation = Donation {
            id: Uuid::new_v4(),
            receipt_no,
            donor_id: cmd.donor_id,
            date: cmd.date,
            category: cmd.category,
            amount: cmd.amount,
            payment_method: cmd.payment_method,
            bank_id: cmd.bank_id,
            remarks: cmd.remarks.unwrap_or_default(),
            is_deleted: false,
            created_at: Utc::now(),
        };
        donations::ActiveModel::from(&donation).insert(&db_tx).await?;

        if let Some(bank_id) = donation.bank_id {
            let remark = format!("donation {}", donation.receipt_no);
            ledger::credit(
                &db_tx,
                bank_id,
                donation.amount,
                Origin::donation(donation.id),
                &remark,
            )
            .await?;
        }

        donors::recompute_stats(&db_tx, donation.donor_id).await?;

        db_tx.commit().await?;
        Ok(donation)
    }

    /// Return a donation.
    pub async fn donation(&self, donation_id: Uuid) -> ResultEngine<Donation> {
        let model = load_live_donation(&self.database, donation_id).await?;
        Donation::try_from(model)
    }

    /// Updates a donation, re-aligning the ledger when the amount or the
    /// bank reference changed: the old credit is reversed with a debit
    /// against the previous account, then the new amount is credited to the
    /// new account. One pair of operations covers every combination of
    /// bank-account change and amount change, and degrades to no ledger
    /// touch when neither changed.
    pub async fn update_donation(
        &self,
        donation_id: Uuid,
        patch: DonationPatch,
    ) -> ResultEngine<Donation> {
        if let Some(amount) = patch.amount {
            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(format!(
                    "donation amount must be > 0, got {amount}"
                )));
            }
        }

        let db_tx = self.database.begin().await?;

        let model = load_live_donation(&db_tx, donation_id).await?;
        let mut donation = Donation::try_from(model)?;

        let previous_donor = donation.donor_id;
        let previous_bank = donation.bank_id;
        let previous_amount = donation.amount;

        if let Some(donor_id) = patch.donor_id {
            donors::Entity::find_by_id(donor_id.to_string())
                .one(&db_tx)
                .await?
                .filter(|d| !d.is_deleted)
                .ok_or_else(|| EngineError::DonorNotFound(donor_id.to_string()))?;
            donation.donor_id = donor_id;
        }
        if let Some(date) = patch.date {
            donation.date = date;
        }
        if let Some(category) = patch.category {
            donation.category = category;
        }
        if let Some(amount) = patch.amount {
            donation.amount = amount;
        }
        if let Some(payment_method) = patch.payment_method {
            donation.payment_method = payment_method;
        }
        if let Some(bank_id) = patch.bank_id {
            donation.bank_id = bank_id;
        }
        if let Some(remarks) = patch.remarks {
            donation.remarks = remarks;
        }

        let ledger_moved =
            previous_bank != donation.bank_id || previous_amount != donation.amount;

        if ledger_moved {
            if let Some(previous_bank) = previous_bank {
                let remark = format!("reversal of donation {}", donation.receipt_no);
                ledger::debit(
                    &db_tx,
                    previous_bank,
                    previous_amount,
                    Origin::donation(donation.id),
                    &remark,
                )
                .await?;
            }
            if let Some(new_bank) = donation.bank_id {
                let remark = format!("donation {}", donation.receipt_no);
                ledger::credit(
                    &db_tx,
                    new_bank,
                    donation.amount,
                    Origin::donation(donation.id),
                    &remark,
                )
                .await?;
            }
        }

        donations::ActiveModel::from(&donation).update(&db_tx).await?;

        donors::recompute_stats(&db_tx, donation.donor_id).await?;
        if previous_donor != donation.donor_id {
            donors::recompute_stats(&db_tx, previous_donor).await?;
        }

        db_tx.commit().await?;
        Ok(donation)
    }

    /// Soft-deletes a donation, reversing its ledger effect first.
    pub async fn delete_donation(&self, donation_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let model = load_live_donation(&db_tx, donation_id).await?;
        let donation = Donation::try_from(model)?;

        if let Some(bank_id) = donation.bank_id {
            let remark = format!("reversal of donation {}", donation.receipt_no);
            ledger::debit(
                &db_tx,
                bank_id,
                donation.amount,
                Origin::donation(donation.id),
                &remark,
            )
            .await?;
        }

        let update = donations::ActiveModel {
            id: ActiveValue::Set(donation.id.to_string()),
            is_deleted: ActiveValue::Set(true),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        donors::recompute_stats(&db_tx, donation.donor_id).await?;

        db_tx.commit().await?;
        Ok(())
    }

    // ── Expense lifecycle ──

    /// Records an expense and debits the paying account. The expense exists
    /// iff the debit succeeded.
    pub async fn new_expense(&self, cmd: ExpenseNew) -> ResultEngine<Expense> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "expense amount must be > 0, got {}",
                cmd.amount
            )));
        }

        let db_tx = self.database.begin().await?;

        let expense = Expense {
            id: Uuid::new_v4(),
            date: cmd.date,
            category: cmd.category,
            description: cmd.description.unwrap_or_default(),
            amount: cmd.amount,
            paid_from: cmd.paid_from,
            is_deleted: false,
            created_at: Utc::now(),
        };
        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

        let remark = format!("expense: {}", expense.category);
        ledger::debit(
            &db_tx,
            expense.paid_from,
            expense.amount,
            Origin::expense(expense.id),
            &remark,
        )
        .await?;

        db_tx.commit().await?;
        Ok(expense)
    }

    /// Return an expense.
    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = load_live_expense(&self.database, expense_id).await?;
        Expense::try_from(model)
    }

    /// Updates an expense, re-aligning the ledger when the amount or the
    /// paying account changed: the old debit is reversed with a credit, then
    /// the new amount is debited from the new account.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        patch: ExpensePatch,
    ) -> ResultEngine<Expense> {
        if let Some(amount) = patch.amount {
            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(format!(
                    "expense amount must be > 0, got {amount}"
                )));
            }
        }

        let db_tx = self.database.begin().await?;

        let model = load_live_expense(&db_tx, expense_id).await?;
        let mut expense = Expense::try_from(model)?;

        let previous_bank = expense.paid_from;
        let previous_amount = expense.amount;

        if let Some(date) = patch.date {
            expense.date = date;
        }
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(description) = patch.description {
            expense.description = description;
        }
        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(paid_from) = patch.paid_from {
            expense.paid_from = paid_from;
        }

        if previous_bank != expense.paid_from || previous_amount != expense.amount {
            ledger::credit(
                &db_tx,
                previous_bank,
                previous_amount,
                Origin::expense(expense.id),
                "reversal of expense",
            )
            .await?;
            let remark = format!("expense: {}", expense.category);
            ledger::debit(
                &db_tx,
                expense.paid_from,
                expense.amount,
                Origin::expense(expense.id),
                &remark,
            )
            .await?;
        }

        expenses::ActiveModel::from(&expense).update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(expense)
    }

    /// Soft-deletes an expense, crediting the paying account back first.
    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let model = load_live_expense(&db_tx, expense_id).await?;
        let expense = Expense::try_from(model)?;

        ledger::credit(
            &db_tx,
            expense.paid_from,
            expense.amount,
            Origin::expense(expense.id),
            "reversal of expense",
        )
        .await?;

        let update = expenses::ActiveModel {
            id: ActiveValue::Set(expense.id.to_string()),
            is_deleted: ActiveValue::Set(true),
            ..Default::default()
        };
        update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }
}

async fn ensure_no_duplicate(
    db_tx: &DatabaseTransaction,
    bank_name: &str,
    account_number: &str,
    exclude_id: Option<&str>,
) -> ResultEngine<()> {
    let mut query = banks::Entity::find()
        .filter(banks::Column::BankName.eq(bank_name))
        .filter(banks::Column::AccountNumber.eq(account_number))
        .filter(banks::Column::Active.eq(true));
    if let Some(id) = exclude_id {
        query = query.filter(banks::Column::Id.ne(id));
    }

    if query.one(db_tx).await?.is_some() {
        return Err(EngineError::AccountExists(format!(
            "{bank_name} / {account_number}"
        )));
    }
    Ok(())
}

async fn load_live_donation<C: ConnectionTrait>(
    conn: &C,
    donation_id: Uuid,
) -> ResultEngine<donations::Model> {
    donations::Entity::find_by_id(donation_id.to_string())
        .one(conn)
        .await?
        .filter(|d| !d.is_deleted)
        .ok_or_else(|| EngineError::NotFound(donation_id.to_string()))
}

async fn load_live_expense<C: ConnectionTrait>(
    conn: &C,
    expense_id: Uuid,
) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(expense_id.to_string())
        .one(conn)
        .await?
        .filter(|e| !e.is_deleted)
        .ok_or_else(|| EngineError::NotFound(expense_id.to_string()))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
