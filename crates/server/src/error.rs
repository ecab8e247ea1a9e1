use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{ledger::LedgerError, payroll::PayrollError};
use thiserror::Error;
use tracing::error;
use utils::{auth::AuthError, response::ApiResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Payroll(#[from] PayrollError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(err) => match err {
                LedgerError::JobNotFound | LedgerError::AssignmentNotFound => {
                    StatusCode::NOT_FOUND
                }
                LedgerError::Conflict => StatusCode::CONFLICT,
                LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Payroll(err) => match err {
                PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        // The client surfaces the reason string verbatim.
        let body = Json(ApiResponse::<()>::error(self.to_string()));
        (status, body).into_response()
    }
}
