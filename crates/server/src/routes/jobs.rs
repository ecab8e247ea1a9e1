//! Routes for job creation, the allocation ledger, and its read views.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    assignment::{Assignment, AssignmentStatus, AssignmentWithEmployee, EmployeeJobView},
    job::{CreateJob, Job, JobSummary},
};
use serde::{Deserialize, Serialize};
use services::services::ledger::{ClaimRequest, CompletionOutcome, JobLedger};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extractor::AuthEmployee};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct JobCreated {
    pub id: Uuid,
}

/// Create a job; its full quantity starts out unclaimed.
pub async fn create_job(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateJob>,
) -> Result<ResponseJson<ApiResponse<JobCreated>>, ApiError> {
    if payload.job_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Job name, quantity, and pay per unit are required fields".to_string(),
        ));
    }
    if payload.quantity <= 0 {
        return Err(ApiError::BadRequest(
            "Quantity must be a positive number".to_string(),
        ));
    }
    if payload.pay_per_unit < 0.0 {
        return Err(ApiError::BadRequest(
            "Pay per unit must be a non-negative number".to_string(),
        ));
    }

    let job = Job::create(&state.db().pool, Uuid::new_v4(), &payload).await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        JobCreated { id: job.id },
        "Job created successfully",
    )))
}

/// Active jobs the calling employee has not rejected.
pub async fn available_jobs(
    State(state): State<AppState>,
    AuthEmployee(employee_id): AuthEmployee,
) -> Result<ResponseJson<ApiResponse<Vec<Job>>>, ApiError> {
    let jobs = Job::find_available_for_employee(&state.db().pool, employee_id).await?;
    Ok(ResponseJson(ApiResponse::success(jobs)))
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateJobStatusRequest {
    pub job_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_quantity: i64,
    pub completion_fraction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct UpdateJobStatusResponse {
    pub remaining_quantity: i64,
    pub is_active: bool,
}

/// Accept or reject a claim against a job's capacity.
pub async fn update_job_status(
    State(state): State<AppState>,
    AuthEmployee(employee_id): AuthEmployee,
    axum::Json(payload): axum::Json<UpdateJobStatusRequest>,
) -> Result<ResponseJson<ApiResponse<UpdateJobStatusResponse>>, ApiError> {
    let ledger = JobLedger::new(state.db().pool.clone());
    let request = ClaimRequest {
        decision: payload.status,
        requested_quantity: payload.assigned_quantity,
        completion_fraction: payload.completion_fraction,
    };

    let outcome = ledger.claim(employee_id, payload.job_id, &request).await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        UpdateJobStatusResponse {
            remaining_quantity: outcome.remaining_quantity,
            is_active: outcome.is_active,
        },
        "Job status updated successfully",
    )))
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateCompletedRequest {
    pub assignment_id: Uuid,
    pub completed_quantity: i64,
}

/// Record the cumulative completed units on the caller's own assignment.
pub async fn update_completed_quantity(
    State(state): State<AppState>,
    AuthEmployee(employee_id): AuthEmployee,
    axum::Json(payload): axum::Json<UpdateCompletedRequest>,
) -> Result<ResponseJson<ApiResponse<CompletionOutcome>>, ApiError> {
    let ledger = JobLedger::new(state.db().pool.clone());
    let outcome = ledger
        .record_completion(employee_id, payload.assignment_id, payload.completed_quantity)
        .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        outcome,
        "Completed quantity updated successfully",
    )))
}

/// All-jobs summary for the admin dashboard.
pub async fn all_jobs(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<JobSummary>>>, ApiError> {
    let summaries = Job::summaries(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(summaries)))
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct JobDetailsRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct JobDetails {
    pub job: Job,
    pub assignments: Vec<AssignmentWithEmployee>,
}

pub async fn job_details(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<JobDetailsRequest>,
) -> Result<ResponseJson<ApiResponse<JobDetails>>, ApiError> {
    let job = Job::find_by_id(&state.db().pool, payload.job_id)
        .await?
        .ok_or(ApiError::NotFound("Job not found"))?;
    let assignments =
        Assignment::find_by_job_with_employees(&state.db().pool, payload.job_id).await?;

    Ok(ResponseJson(ApiResponse::success(JobDetails {
        job,
        assignments,
    })))
}

/// Everything the calling employee has claimed, with derived progress.
pub async fn my_assigned_jobs(
    State(state): State<AppState>,
    AuthEmployee(employee_id): AuthEmployee,
) -> Result<ResponseJson<ApiResponse<Vec<EmployeeJobView>>>, ApiError> {
    let views = Assignment::find_views_for_employee(&state.db().pool, employee_id).await?;
    Ok(ResponseJson(ApiResponse::success(views)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/job",
        Router::new()
            .route("/", post(create_job))
            .route("/available", get(available_jobs))
            .route("/update", put(update_job_status))
            .route("/update_complete", put(update_completed_quantity))
            .route("/jobs", get(all_jobs))
            .route("/jobs_de", post(job_details))
            .route("/get_all", get(my_assigned_jobs)),
    )
}
