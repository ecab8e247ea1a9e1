//! Employee directory and bearer-token issuance.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::employee::{CreateEmployee, Employee};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::{auth, response::ApiResponse};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn create_employee(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateEmployee>,
) -> Result<ResponseJson<ApiResponse<Employee>>, ApiError> {
    if payload.employee_name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Employee name and email are required fields".to_string(),
        ));
    }

    let employee = Employee::create(&state.db().pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        employee,
        "Employee created successfully",
    )))
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Employee>>>, ApiError> {
    let employees = Employee::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(employees)))
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct LoginResponse {
    pub token: String,
    pub employee: Employee,
}

/// Issue the opaque bearer token the job routes resolve back to an
/// employee id. Credential verification is out of scope here.
pub async fn login(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let employee = Employee::find_by_email(&state.db().pool, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("Employee not found"))?;

    let token = auth::issue_employee_token(employee.id)?;
    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        token,
        employee,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/employees",
        Router::new()
            .route("/", post(create_employee).get(list_employees))
            .route("/login", post(login)),
    )
}
