//! Donations API endpoints.

use api_types::donation::{DonationNew, DonationUpdate, DonationView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_donation(donation: engine::Donation) -> DonationView {
    DonationView {
        id: donation.id,
        receipt_no: donation.receipt_no,
        donor_id: donation.donor_id,
        date: donation.date,
        category: donation.category,
        amount_minor: donation.amount.minor(),
        payment_method: donation.payment_method,
        bank_id: donation.bank_id,
        remarks: donation.remarks,
        created_at: donation.created_at,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DonationNew>,
) -> Result<(StatusCode, Json<DonationView>), ServerError> {
    let donation = state
        .engine
        .new_donation(engine::DonationNew {
            donor_id: payload.donor_id,
            date: payload.date,
            category: payload.category,
            amount: Money::new(payload.amount_minor),
            payment_method: payload.payment_method,
            bank_id: payload.bank_id,
            remarks: payload.remarks,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_donation(donation))))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(donation_id): Path<Uuid>,
) -> Result<Json<DonationView>, ServerError> {
    let donation = state.engine.donation(donation_id).await?;
    Ok(Json(map_donation(donation)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(donation_id): Path<Uuid>,
    Json(payload): Json<DonationUpdate>,
) -> Result<Json<DonationView>, ServerError> {
    let donation = state
        .engine
        .update_donation(
            donation_id,
            engine::DonationPatch {
                donor_id: payload.donor_id,
                date: payload.date,
                category: payload.category,
                amount: payload.amount_minor.map(Money::new),
                payment_method: payload.payment_method,
                bank_id: payload.bank_id,
                remarks: payload.remarks,
            },
        )
        .await?;

    Ok(Json(map_donation(donation)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(donation_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_donation(donation_id).await?;
    Ok(StatusCode::OK)
}
