//! Bank accounts API endpoints.

use api_types::bank::{
    BankCreated, BankList, BankNew, BankRename, BankView, LedgerEntryView, StatementQuery,
    StatementResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_account(account: engine::BankAccount) -> BankView {
    BankView {
        id: account.id,
        bank_name: account.bank_name,
        account_name: account.account_name,
        account_number: account.account_number,
        balance_minor: account.balance.minor(),
        active: account.active,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BankNew>,
) -> Result<(StatusCode, Json<BankCreated>), ServerError> {
    let bank_name = payload.bank_name.trim();
    let account_name = payload.account_name.trim();
    let account_number = payload.account_number.trim();
    if bank_name.is_empty() || account_name.is_empty() || account_number.is_empty() {
        return Err(ServerError::Generic(
            "bank_name, account_name and account_number are required".to_string(),
        ));
    }

    let account = state
        .engine
        .new_bank_account(bank_name, account_name, account_number)
        .await?;

    Ok((StatusCode::CREATED, Json(BankCreated { id: account.id })))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BankList>, ServerError> {
    let accounts = state.engine.active_accounts().await?;
    Ok(Json(BankList {
        banks: accounts.into_iter().map(map_account).collect(),
    }))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<BankView>, ServerError> {
    let account = state.engine.account(account_id).await?;
    Ok(Json(map_account(account)))
}

pub async fn rename(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<BankRename>,
) -> Result<Json<BankView>, ServerError> {
    if payload.bank_name.is_none()
        && payload.account_name.is_none()
        && payload.account_number.is_none()
    {
        return Err(ServerError::Generic(
            "provide at least one of bank_name, account_name or account_number".to_string(),
        ));
    }

    state
        .engine
        .rename_account(
            account_id,
            payload.bank_name.as_deref(),
            payload.account_name.as_deref(),
            payload.account_number.as_deref(),
        )
        .await?;

    let account = state.engine.account(account_id).await?;
    Ok(Json(map_account(account)))
}

pub async fn deactivate(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_account(account_id).await?;
    Ok(StatusCode::OK)
}

pub async fn statement(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<StatementResponse>, ServerError> {
    let limit = query.limit.unwrap_or(50);
    let rows = state.engine.account_statement(account_id, limit).await?;

    let transactions = rows
        .into_iter()
        .map(|row| LedgerEntryView {
            id: row.id,
            direction: row.direction.as_str().to_string(),
            amount_minor: row.amount.minor(),
            origin_kind: row.origin.kind.as_str().to_string(),
            origin_id: row.origin.id,
            occurred_at: row.occurred_at,
            remark: row.remark,
        })
        .collect();

    Ok(Json(StatementResponse { transactions }))
}
