//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `donors`: donor registry with derived aggregate stats
//! - `bank_accounts`: charity bank accounts with a materialized balance
//! - `donations`: donation records with per-year receipt numbers
//! - `expenses`: expense records paid from a bank account
//! - `ledger_transactions`: append-only audit trail of balance mutations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Donors {
    Table,
    Id,
    Name,
    Phone,
    TotalDonationsMinor,
    LastDonationDate,
    IsDeleted,
}

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    BankName,
    AccountName,
    AccountNumber,
    BalanceMinor,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    ReceiptNo,
    DonorId,
    Date,
    Category,
    AmountMinor,
    PaymentMethod,
    BankId,
    Remarks,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Date,
    Category,
    Description,
    AmountMinor,
    PaidFrom,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    Id,
    AccountId,
    Direction,
    AmountMinor,
    OriginKind,
    OriginId,
    OccurredAt,
    Remark,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Donors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Donors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Donors::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Donors::Name).string().not_null())
                    .col(ColumnDef::new(Donors::Phone).string())
                    .col(
                        ColumnDef::new(Donors::TotalDonationsMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Donors::LastDonationDate).date())
                    .col(
                        ColumnDef::new(Donors::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Bank accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::BankName).string().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::AccountName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::AccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness of bank + number is enforced in the engine among
        // *active* accounts only, so a deactivated account's number can be
        // reused; the index here is for lookups.
        manager
            .create_index(
                Index::create()
                    .name("idx-bank_accounts-bank_name-account_number")
                    .table(BankAccounts::Table)
                    .col(BankAccounts::BankName)
                    .col(BankAccounts::AccountNumber)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Donations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::ReceiptNo).string().not_null())
                    .col(ColumnDef::new(Donations::DonorId).string().not_null())
                    .col(ColumnDef::new(Donations::Date).date().not_null())
                    .col(ColumnDef::new(Donations::Category).string().not_null())
                    .col(
                        ColumnDef::new(Donations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Donations::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Donations::BankId).string())
                    .col(
                        ColumnDef::new(Donations::Remarks)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Donations::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-donor_id")
                            .from(Donations::Table, Donations::DonorId)
                            .to(Donors::Table, Donors::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-bank_id")
                            .from(Donations::Table, Donations::BankId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-receipt_no-unique")
                    .table(Donations::Table)
                    .col(Donations::ReceiptNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-donor_id")
                    .table(Donations::Table)
                    .col(Donations::DonorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-date")
                    .table(Donations::Table)
                    .col(Donations::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::PaidFrom).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-paid_from")
                            .from(Expenses::Table, Expenses::PaidFrom)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-paid_from")
                    .table(Expenses::Table)
                    .col(Expenses::PaidFrom)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-date")
                    .table(Expenses::Table)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Ledger transactions (append-only)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Direction)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::OriginKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::OriginId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Remark)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_transactions-account_id")
                            .from(LedgerTransactions::Table, LedgerTransactions::AccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-account_id-occurred_at")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::AccountId)
                    .col(LedgerTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-origin")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::OriginKind)
                    .col(LedgerTransactions::OriginId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
