//! Donors API endpoints.

use api_types::donor::{DonorCreated, DonorNew, DonorView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DonorNew>,
) -> Result<(StatusCode, Json<DonorCreated>), ServerError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ServerError::Generic("name is required".to_string()));
    }

    let donor = state.engine.new_donor(name, payload.phone.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(DonorCreated { id: donor.id })))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(donor_id): Path<Uuid>,
) -> Result<Json<DonorView>, ServerError> {
    let donor = state.engine.donor(donor_id).await?;
    Ok(Json(DonorView {
        id: donor.id,
        name: donor.name,
        phone: donor.phone,
        total_donations_minor: donor.total_donations.minor(),
        last_donation_date: donor.last_donation_date,
    }))
}
