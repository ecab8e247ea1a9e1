use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::projection::{self, ProgressLabel};

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl AssignmentStatus {
    /// Transition table for the accept/reject decision. Pending may move
    /// anywhere; accepted and rejected are sticky, so the only legal move
    /// out of them is a same-status re-claim (accepting more quantity on an
    /// accepted assignment, or repeating a rejection).
    pub fn can_become(self, next: AssignmentStatus) -> bool {
        self == AssignmentStatus::Pending || self == next
    }
}

/// One employee's claim against one job's capacity. At most one row per
/// (employee, job) pair; re-claims update the row, never duplicate it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Assignment {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub job_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_quantity: i64,
    pub completed_quantity: i64,
    /// Informational only; never drives any decision.
    pub completion_fraction: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment joined with employee identity for the job detail view.
#[derive(Debug, Clone, Serialize, TS)]
pub struct AssignmentWithEmployee {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    pub employee_name: String,
    pub email: String,
    pub earned_amount: f64,
}

#[derive(FromRow)]
struct AssignmentEmployeeRow {
    #[sqlx(flatten)]
    assignment: Assignment,
    employee_name: String,
    email: String,
    pay_per_unit: f64,
}

/// Assignment joined with its job for the employee task list, carrying the
/// read-time projections.
#[derive(Debug, Clone, Serialize, TS)]
pub struct EmployeeJobView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    pub job_name: String,
    pub description: Option<String>,
    pub pay_per_unit: f64,
    pub design_image: Option<String>,
    pub is_active: bool,
    pub earned_amount: f64,
    /// Units left within this employee's own reservation.
    pub remaining_quantity: i64,
    pub job_status: ProgressLabel,
}

#[derive(FromRow)]
struct EmployeeJobRow {
    #[sqlx(flatten)]
    assignment: Assignment,
    job_name: String,
    description: Option<String>,
    pay_per_unit: f64,
    design_image: Option<String>,
    is_active: bool,
}

impl Assignment {
    pub async fn find_by_employee_and_job<'e, E>(
        executor: E,
        employee_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM employee_job_assignments WHERE employee_id = ?1 AND job_id = ?2",
        )
        .bind(employee_id)
        .bind(job_id)
        .fetch_optional(executor)
        .await
    }

    /// Ownership-filtered lookup: an employee can only see (and therefore
    /// only mutate) their own assignment rows.
    pub async fn find_by_id_and_employee<'e, E>(
        executor: E,
        id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM employee_job_assignments WHERE id = ?1 AND employee_id = ?2",
        )
        .bind(id)
        .bind(employee_id)
        .fetch_optional(executor)
        .await
    }

    /// First claim by an employee for a job.
    pub async fn insert<'e, E>(
        executor: E,
        id: Uuid,
        employee_id: Uuid,
        job_id: Uuid,
        status: AssignmentStatus,
        assigned_quantity: i64,
        completion_fraction: Option<f64>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"INSERT INTO employee_job_assignments
                   (id, employee_id, job_id, status, assigned_quantity, completion_fraction)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(employee_id)
        .bind(job_id)
        .bind(status)
        .bind(assigned_quantity)
        .bind(completion_fraction)
        .fetch_one(executor)
        .await
    }

    /// Re-claim against an existing row: accumulates quantity, never
    /// replaces it.
    pub async fn apply_claim<'e, E>(
        executor: E,
        id: Uuid,
        status: AssignmentStatus,
        quantity_delta: i64,
        completion_fraction: Option<f64>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"UPDATE employee_job_assignments
               SET status = ?1,
                   assigned_quantity = assigned_quantity + ?2,
                   completion_fraction = COALESCE(?3, completion_fraction),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?4
               RETURNING *"#,
        )
        .bind(status)
        .bind(quantity_delta)
        .bind(completion_fraction)
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Absolute set of finished units; callers send the cumulative total.
    pub async fn set_completed_quantity<'e, E>(
        executor: E,
        id: Uuid,
        completed_quantity: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"UPDATE employee_job_assignments
               SET completed_quantity = ?1,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?2
               RETURNING *"#,
        )
        .bind(completed_quantity)
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// All assignments for a job, joined with employee identity, for the
    /// admin job detail view.
    pub async fn find_by_job_with_employees(
        pool: &SqlitePool,
        job_id: Uuid,
    ) -> Result<Vec<AssignmentWithEmployee>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AssignmentEmployeeRow>(
            r#"SELECT
                   a.*,
                   e.employee_name AS employee_name,
                   e.email AS email,
                   j.pay_per_unit AS pay_per_unit
               FROM employee_job_assignments a
               JOIN employees e ON e.id = a.employee_id
               JOIN jobs j ON j.id = a.job_id
               WHERE a.job_id = ?1
               ORDER BY a.status, a.updated_at DESC"#,
        )
        .bind(job_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let earned_amount = projection::earned_amount(
                    row.assignment.completed_quantity,
                    row.pay_per_unit,
                );
                AssignmentWithEmployee {
                    assignment: row.assignment,
                    employee_name: row.employee_name,
                    email: row.email,
                    earned_amount,
                }
            })
            .collect())
    }

    /// Everything one employee has claimed, with derived progress fields.
    pub async fn find_views_for_employee(
        pool: &SqlitePool,
        employee_id: Uuid,
    ) -> Result<Vec<EmployeeJobView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EmployeeJobRow>(
            r#"SELECT
                   a.*,
                   j.job_name AS job_name,
                   j.description AS description,
                   j.pay_per_unit AS pay_per_unit,
                   j.design_image AS design_image,
                   j.is_active AS is_active
               FROM employee_job_assignments a
               JOIN jobs j ON j.id = a.job_id
               WHERE a.employee_id = ?1"#,
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        let mut views: Vec<EmployeeJobView> = rows
            .into_iter()
            .map(|row| {
                let job_status = projection::progress_label(row.is_active, row.assignment.status);
                let earned_amount = projection::earned_amount(
                    row.assignment.completed_quantity,
                    row.pay_per_unit,
                );
                let remaining_quantity = projection::remaining_allocation(
                    row.assignment.assigned_quantity,
                    row.assignment.completed_quantity,
                );
                EmployeeJobView {
                    assignment: row.assignment,
                    job_name: row.job_name,
                    description: row.description,
                    pay_per_unit: row.pay_per_unit,
                    design_image: row.design_image,
                    is_active: row.is_active,
                    earned_amount,
                    remaining_quantity,
                    job_status,
                }
            })
            .collect();

        views.sort_by(|a, b| {
            a.job_status
                .sort_rank()
                .cmp(&b.job_status.sort_rank())
                .then(b.assignment.updated_at.cmp(&a.assignment.updated_at))
        });

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_move_anywhere() {
        assert!(AssignmentStatus::Pending.can_become(AssignmentStatus::Accepted));
        assert!(AssignmentStatus::Pending.can_become(AssignmentStatus::Rejected));
    }

    #[test]
    fn decision_is_sticky() {
        assert!(!AssignmentStatus::Accepted.can_become(AssignmentStatus::Rejected));
        assert!(!AssignmentStatus::Rejected.can_become(AssignmentStatus::Accepted));
    }

    #[test]
    fn same_status_reclaim_is_allowed() {
        assert!(AssignmentStatus::Accepted.can_become(AssignmentStatus::Accepted));
        assert!(AssignmentStatus::Rejected.can_become(AssignmentStatus::Rejected));
    }
}
