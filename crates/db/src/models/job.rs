use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::projection;

/// A piecework job: a fixed total unit quantity at a fixed per-unit rate.
///
/// `quantity` is immutable after creation. `remaining_quantity` is the
/// shared capacity ledger, decremented only by accepted claims; once it
/// reaches zero `is_active` flips off and never back on.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Job {
    pub id: Uuid,
    pub job_name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub quantity: i64,
    pub remaining_quantity: i64,
    pub pay_per_unit: f64,
    pub design_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateJob {
    pub job_name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub quantity: i64,
    pub pay_per_unit: f64,
    /// Opaque reference to a stored design asset.
    pub design_image: Option<String>,
}

/// Dashboard row: job plus aggregate claim/completion figures, grouped at
/// read time so it is always consistent with the underlying rows.
#[derive(Debug, Clone, Serialize, TS)]
pub struct JobSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub job: Job,
    pub accepted_count: i64,
    pub rejected_count: i64,
    pub total_assigned: i64,
    pub total_completed: i64,
    pub total_earned: f64,
}

#[derive(FromRow)]
struct JobSummaryRow {
    #[sqlx(flatten)]
    job: Job,
    accepted_count: i64,
    rejected_count: i64,
    total_assigned: i64,
    total_completed: i64,
}

impl Job {
    pub async fn create(pool: &SqlitePool, id: Uuid, data: &CreateJob) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"INSERT INTO jobs
                   (id, job_name, description, start_date, end_date,
                    quantity, remaining_quantity, pay_per_unit, design_image)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.job_name)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.quantity)
        .bind(data.pay_per_unit)
        .bind(&data.design_image)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Guarded capacity decrement. The WHERE clause re-checks the remaining
    /// quantity inside the write itself, so two racing claims can never both
    /// observe a stale value and jointly over-allocate. Returns the number
    /// of rows updated: zero means the capacity check failed.
    ///
    /// Exhausting the capacity flips `is_active` off in the same statement;
    /// nothing ever flips it back.
    pub async fn claim_capacity<'e, E>(
        executor: E,
        id: Uuid,
        delta: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE jobs
               SET remaining_quantity = remaining_quantity - ?1,
                   is_active = CASE WHEN remaining_quantity - ?1 <= 0 THEN 0 ELSE is_active END,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?2 AND is_active = 1 AND remaining_quantity >= ?1"#,
        )
        .bind(delta)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn fetch_capacity<'e, E>(executor: E, id: Uuid) -> Result<(i64, bool), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, (i64, bool)>(
            "SELECT remaining_quantity, is_active FROM jobs WHERE id = ?1",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Active jobs this employee has not rejected. Jobs the employee already
    /// accepted stay listed so they can claim more quantity.
    pub async fn find_available_for_employee(
        pool: &SqlitePool,
        employee_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"SELECT j.* FROM jobs j
               LEFT JOIN employee_job_assignments a
                   ON a.job_id = j.id AND a.employee_id = ?1
               WHERE j.is_active = 1
                 AND (a.status IS NULL OR a.status != 'rejected')
               ORDER BY j.created_at DESC"#,
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await
    }

    /// All-jobs summary for the admin dashboard. Missing assignments
    /// contribute zero, never an error.
    pub async fn summaries(pool: &SqlitePool) -> Result<Vec<JobSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, JobSummaryRow>(
            r#"SELECT
                   j.*,
                   COUNT(CASE WHEN a.status = 'accepted' THEN 1 END) AS accepted_count,
                   COUNT(CASE WHEN a.status = 'rejected' THEN 1 END) AS rejected_count,
                   COALESCE(SUM(CASE WHEN a.status = 'accepted' THEN a.assigned_quantity ELSE 0 END), 0) AS total_assigned,
                   COALESCE(SUM(CASE WHEN a.status = 'accepted' THEN a.completed_quantity ELSE 0 END), 0) AS total_completed
               FROM jobs j
               LEFT JOIN employee_job_assignments a ON a.job_id = j.id
               GROUP BY j.id
               ORDER BY j.created_at DESC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let total_earned =
                    projection::earned_amount(row.total_completed, row.job.pay_per_unit);
                JobSummary {
                    job: row.job,
                    accepted_count: row.accepted_count,
                    rejected_count: row.rejected_count,
                    total_assigned: row.total_assigned,
                    total_completed: row.total_completed,
                    total_earned,
                }
            })
            .collect())
    }
}
