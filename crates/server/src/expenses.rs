//! Expenses API endpoints.

use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        date: expense.date,
        category: expense.category,
        description: expense.description,
        amount_minor: expense.amount.minor(),
        paid_from: expense.paid_from,
        created_at: expense.created_at,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .new_expense(engine::ExpenseNew {
            date: payload.date,
            category: payload.category,
            description: payload.description,
            amount: Money::new(payload.amount_minor),
            paid_from: payload.paid_from,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(expense_id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            expense_id,
            engine::ExpensePatch {
                date: payload.date,
                category: payload.category,
                description: payload.description,
                amount: payload.amount_minor.map(Money::new),
                paid_from: payload.paid_from,
            },
        )
        .await?;

    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(expense_id).await?;
    Ok(StatusCode::OK)
}
