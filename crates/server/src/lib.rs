use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ApiError;
pub use server::{app, run_with_listener};

mod banks;
mod donations;
mod donors;
mod expenses;
mod server;
mod user;

pub mod types {
    pub mod bank {
        pub use api_types::bank::{
            BankCreated, BankList, BankNew, BankRename, BankView, LedgerEntryView,
            StatementResponse,
        };
    }

    pub mod donor {
        pub use api_types::donor::{DonorCreated, DonorNew, DonorView};
    }

    pub mod donation {
        pub use api_types::donation::{DonationNew, DonationUpdate, DonationView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpenseView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::BankNotFound(_)
        | EngineError::DonorNotFound(_)
        | EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AccountExists(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::BankInactive(_)
        | EngineError::InsufficientFunds(_)
        | EngineError::BalanceNotZero(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                err.code(),
                message_for_engine_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err),
        };

        (
            status,
            Json(ApiError {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::BankNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn donor_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::DonorNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_account_maps_to_409() {
        let res = ServerError::from(EngineError::AccountExists("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn insufficient_funds_maps_to_422() {
        let res =
            ServerError::from(EngineError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn inactive_account_maps_to_422() {
        let res = ServerError::from(EngineError::BankInactive("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_maps_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "boom".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
