//! Payroll routes: freezing salaries from completed piecework and reading
//! them back.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::salary::{
    EligibleEmployee, Salary, SalaryBreakdown, SalaryWithEmployee,
};
use serde::Deserialize;
use services::services::payroll::{CreateSalary, Payroll};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extractor::AuthEmployee};

#[derive(Debug, Clone, Deserialize, TS)]
pub struct PeriodRequest {
    pub month: i64,
    pub year: i64,
}

/// Employees with payable work in a period, before any salary exists.
pub async fn eligible_employees(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<PeriodRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<EligibleEmployee>>>, ApiError> {
    let eligible =
        Salary::eligible_for_period(&state.db().pool, payload.month, payload.year).await?;
    Ok(ResponseJson(ApiResponse::success(eligible)))
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSalaryRequest {
    pub employee_id: Uuid,
    pub month: i64,
    pub year: i64,
    pub bonus: Option<f64>,
}

pub async fn create_salary(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateSalaryRequest>,
) -> Result<ResponseJson<ApiResponse<Salary>>, ApiError> {
    let payroll = Payroll::new(state.db().pool.clone());
    let salary = payroll
        .create(&CreateSalary {
            employee_id: payload.employee_id,
            month: payload.month,
            year: payload.year,
            bonus: payload.bonus,
        })
        .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        salary,
        "Salary created successfully",
    )))
}

pub async fn list_salaries(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<SalaryWithEmployee>>>, ApiError> {
    let salaries = Salary::list_with_employees(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(salaries)))
}

/// The calling employee's own salary statements.
pub async fn my_salaries(
    State(state): State<AppState>,
    AuthEmployee(employee_id): AuthEmployee,
) -> Result<ResponseJson<ApiResponse<Vec<SalaryWithEmployee>>>, ApiError> {
    let salaries = Salary::find_for_employee(&state.db().pool, employee_id).await?;
    Ok(ResponseJson(ApiResponse::success(salaries)))
}

pub async fn salary_breakdown(
    State(state): State<AppState>,
    Path(salary_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<SalaryBreakdown>>, ApiError> {
    let breakdown = Salary::breakdown(&state.db().pool, salary_id)
        .await?
        .ok_or(ApiError::NotFound("Salary record not found"))?;
    Ok(ResponseJson(ApiResponse::success(breakdown)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/salaries",
        Router::new()
            .route("/", post(create_salary).get(list_salaries))
            .route("/eligible", post(eligible_employees))
            .route("/mine", get(my_salaries))
            .route("/{salary_id}", get(salary_breakdown)),
    )
}
