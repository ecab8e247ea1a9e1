//! The job allocation ledger.
//!
//! Owns the lifecycle of a job's remaining capacity, employee claims against
//! that capacity, and derived earnings. `remaining_quantity` is the single
//! shared mutable resource; only `claim` mutates it, always inside one
//! transaction whose capacity check happens in the write itself
//! (`Job::claim_capacity`), so two racing claims can never jointly
//! over-allocate.

use db::models::{
    assignment::{Assignment, AssignmentStatus},
    job::Job,
    projection,
};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Job not found")]
    JobNotFound,
    #[error("Job is no longer active")]
    JobInactive,
    #[error("{}", illegal_transition_message(.from, .to))]
    IllegalTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    #[error("Not enough remaining quantity available")]
    InsufficientCapacity,
    #[error("Assigned job not found")]
    AssignmentNotFound,
    #[error("Completed quantity cannot exceed assigned quantity")]
    ExceedsAssigned,
    #[error("{0}")]
    Validation(String),
    #[error("Operation conflicted with a concurrent update, please retry")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn illegal_transition_message(from: &AssignmentStatus, to: &AssignmentStatus) -> String {
    match to {
        AssignmentStatus::Rejected => format!("Cannot reject an already {from} job"),
        AssignmentStatus::Accepted => format!("Cannot accept an already {from} job"),
        AssignmentStatus::Pending => format!("Cannot move an already {from} job back to pending"),
    }
}

impl LedgerError {
    /// Lock contention or an invalidated write snapshot; the whole operation
    /// is safe to retry from the top.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict)
    }
}

/// SQLite reports lock contention as busy/locked/snapshot errors rather than
/// blocking row locks.
fn map_db(e: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db) = &e {
        let msg = db.message();
        if msg.contains("database is locked")
            || msg.contains("database table is locked")
            || msg.contains("snapshot")
        {
            return LedgerError::Conflict;
        }
    }
    LedgerError::Database(e)
}

/// An employee's accept/reject decision against a job, with the quantity
/// they want to reserve.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub decision: AssignmentStatus,
    pub requested_quantity: i64,
    /// Informational; stored verbatim, never validated or acted on.
    pub completion_fraction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ClaimOutcome {
    pub assignment: Assignment,
    pub remaining_quantity: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CompletionOutcome {
    pub completed_quantity: i64,
    pub earnings: f64,
}

#[derive(Clone)]
pub struct JobLedger {
    pool: SqlitePool,
}

impl JobLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Accept or reject an allocation against a job's remaining capacity.
    ///
    /// Runs as a single atomic unit over the job and assignment rows: any
    /// failure rolls back every write. Accepted quantity accumulates across
    /// re-claims; the decision itself is sticky once accepted or rejected.
    pub async fn claim(
        &self,
        employee_id: Uuid,
        job_id: Uuid,
        request: &ClaimRequest,
    ) -> Result<ClaimOutcome, LedgerError> {
        if request.decision == AssignmentStatus::Pending {
            return Err(LedgerError::Validation(
                "Status must be accepted or rejected".to_string(),
            ));
        }
        if request.requested_quantity < 0 {
            return Err(LedgerError::Validation(
                "Assigned quantity must be a non-negative number".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(map_db)?;

        let job = Job::find_by_id(&mut *tx, job_id)
            .await
            .map_err(map_db)?
            .ok_or(LedgerError::JobNotFound)?;
        if !job.is_active {
            return Err(LedgerError::JobInactive);
        }

        let existing = Assignment::find_by_employee_and_job(&mut *tx, employee_id, job_id)
            .await
            .map_err(map_db)?;

        if let Some(assignment) = &existing
            && !assignment.status.can_become(request.decision)
        {
            return Err(LedgerError::IllegalTransition {
                from: assignment.status,
                to: request.decision,
            });
        }

        // Rejections reserve nothing; only accepted quantity hits the ledger.
        let delta = match request.decision {
            AssignmentStatus::Accepted => request.requested_quantity,
            _ => 0,
        };

        if delta > 0 {
            let updated = Job::claim_capacity(&mut *tx, job_id, delta)
                .await
                .map_err(map_db)?;
            if updated == 0 {
                return Err(LedgerError::InsufficientCapacity);
            }
        }

        let assignment = match existing {
            Some(assignment) => Assignment::apply_claim(
                &mut *tx,
                assignment.id,
                request.decision,
                delta,
                request.completion_fraction,
            )
            .await
            .map_err(map_db)?,
            None => Assignment::insert(
                &mut *tx,
                Uuid::new_v4(),
                employee_id,
                job_id,
                request.decision,
                delta,
                request.completion_fraction,
            )
            .await
            .map_err(map_db)?,
        };

        let (remaining_quantity, is_active) = Job::fetch_capacity(&mut *tx, job_id)
            .await
            .map_err(map_db)?;

        tx.commit().await.map_err(map_db)?;

        info!(
            job_id = %job_id,
            employee_id = %employee_id,
            decision = %request.decision,
            delta,
            remaining_quantity,
            "claim committed"
        );

        Ok(ClaimOutcome {
            assignment,
            remaining_quantity,
            is_active,
        })
    }

    /// Record the cumulative number of finished units on an assignment.
    ///
    /// Completion tracks progress within an existing reservation; it never
    /// touches the job's remaining capacity.
    pub async fn record_completion(
        &self,
        employee_id: Uuid,
        assignment_id: Uuid,
        completed_quantity: i64,
    ) -> Result<CompletionOutcome, LedgerError> {
        if completed_quantity < 0 {
            return Err(LedgerError::Validation(
                "Completed quantity must be a non-negative number".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(map_db)?;

        let assignment = Assignment::find_by_id_and_employee(&mut *tx, assignment_id, employee_id)
            .await
            .map_err(map_db)?
            .ok_or(LedgerError::AssignmentNotFound)?;

        if completed_quantity > assignment.assigned_quantity {
            return Err(LedgerError::ExceedsAssigned);
        }

        let job = Job::find_by_id(&mut *tx, assignment.job_id)
            .await
            .map_err(map_db)?
            .ok_or(LedgerError::JobNotFound)?;

        Assignment::set_completed_quantity(&mut *tx, assignment_id, completed_quantity)
            .await
            .map_err(map_db)?;

        let earnings = projection::earned_amount(completed_quantity, job.pay_per_unit);

        tx.commit().await.map_err(map_db)?;

        info!(
            assignment_id = %assignment_id,
            employee_id = %employee_id,
            completed_quantity,
            earnings,
            "completion recorded"
        );

        Ok(CompletionOutcome {
            completed_quantity,
            earnings,
        })
    }
}
