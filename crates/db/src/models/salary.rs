use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A salary frozen for one employee and one month/year period.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Salary {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: i64,
    pub year: i64,
    pub base_salary: f64,
    pub bonus: f64,
    pub total_salary: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-job breakdown line persisted at salary-creation time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SalaryDetail {
    pub id: Uuid,
    pub salary_id: Uuid,
    pub job_id: Uuid,
    pub quantity: i64,
    pub pay_per_unit: f64,
    pub subtotal: f64,
}

/// An accepted assignment with finished units inside a payroll period.
#[derive(Debug, Clone, FromRow)]
pub struct CompletedLine {
    pub job_id: Uuid,
    pub job_name: String,
    pub completed_quantity: i64,
    pub pay_per_unit: f64,
}

/// Grouped earnings per employee for a period, before a salary exists.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
pub struct EligibleEmployee {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub base_salary: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, TS)]
pub struct SalaryWithEmployee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub salary: Salary,
    pub employee_name: String,
}

/// Detail line joined with the job it priced.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
pub struct SalaryDetailLine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub detail: SalaryDetail,
    pub job_name: String,
}

/// Full breakdown for one salary record.
#[derive(Debug, Clone, Serialize, TS)]
pub struct SalaryBreakdown {
    #[serde(flatten)]
    #[ts(flatten)]
    pub salary: Salary,
    pub employee_name: String,
    pub email: String,
    pub details: Vec<SalaryDetailLine>,
}

#[derive(FromRow)]
struct SalaryEmployeeRow {
    #[sqlx(flatten)]
    salary: Salary,
    employee_name: String,
    email: String,
}

impl Salary {
    pub async fn exists_for_period<'e, E>(
        executor: E,
        employee_id: Uuid,
        month: i64,
        year: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM salaries WHERE employee_id = ?1 AND month = ?2 AND year = ?3",
        )
        .bind(employee_id)
        .bind(month)
        .bind(year)
        .fetch_optional(executor)
        .await?;
        Ok(row.is_some())
    }

    pub async fn insert<'e, E>(
        executor: E,
        id: Uuid,
        employee_id: Uuid,
        month: i64,
        year: i64,
        base_salary: f64,
        bonus: f64,
        total_salary: f64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Salary>(
            r#"INSERT INTO salaries
                   (id, employee_id, month, year, base_salary, bonus, total_salary)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               RETURNING *"#,
        )
        .bind(id)
        .bind(employee_id)
        .bind(month)
        .bind(year)
        .bind(base_salary)
        .bind(bonus)
        .bind(total_salary)
        .fetch_one(executor)
        .await
    }

    /// Accepted assignments with finished units whose last update falls in
    /// the given period.
    pub async fn completed_lines_for_period<'e, E>(
        executor: E,
        employee_id: Uuid,
        month: i64,
        year: i64,
    ) -> Result<Vec<CompletedLine>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CompletedLine>(
            r#"SELECT
                   a.job_id AS job_id,
                   j.job_name AS job_name,
                   a.completed_quantity AS completed_quantity,
                   j.pay_per_unit AS pay_per_unit
               FROM employee_job_assignments a
               JOIN jobs j ON j.id = a.job_id
               WHERE a.employee_id = ?1
                 AND a.status = 'accepted'
                 AND a.completed_quantity > 0
                 AND CAST(strftime('%m', a.updated_at) AS INTEGER) = ?2
                 AND CAST(strftime('%Y', a.updated_at) AS INTEGER) = ?3"#,
        )
        .bind(employee_id)
        .bind(month)
        .bind(year)
        .fetch_all(executor)
        .await
    }

    /// Employees with payable work in a period, grouped with their earnings.
    pub async fn eligible_for_period(
        pool: &SqlitePool,
        month: i64,
        year: i64,
    ) -> Result<Vec<EligibleEmployee>, sqlx::Error> {
        sqlx::query_as::<_, EligibleEmployee>(
            r#"SELECT
                   e.id AS employee_id,
                   e.employee_name AS employee_name,
                   SUM(a.completed_quantity * j.pay_per_unit) AS base_salary
               FROM employees e
               JOIN employee_job_assignments a ON a.employee_id = e.id
               JOIN jobs j ON j.id = a.job_id
               WHERE a.status = 'accepted'
                 AND a.completed_quantity > 0
                 AND CAST(strftime('%m', a.updated_at) AS INTEGER) = ?1
                 AND CAST(strftime('%Y', a.updated_at) AS INTEGER) = ?2
               GROUP BY e.id
               ORDER BY e.employee_name ASC"#,
        )
        .bind(month)
        .bind(year)
        .fetch_all(pool)
        .await
    }

    pub async fn list_with_employees(pool: &SqlitePool) -> Result<Vec<SalaryWithEmployee>, sqlx::Error> {
        sqlx::query_as::<_, SalaryWithEmployee>(
            r#"SELECT s.*, e.employee_name AS employee_name
               FROM salaries s
               JOIN employees e ON e.id = s.employee_id
               ORDER BY s.year DESC, s.month DESC, e.employee_name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_employee(
        pool: &SqlitePool,
        employee_id: Uuid,
    ) -> Result<Vec<SalaryWithEmployee>, sqlx::Error> {
        sqlx::query_as::<_, SalaryWithEmployee>(
            r#"SELECT s.*, e.employee_name AS employee_name
               FROM salaries s
               JOIN employees e ON e.id = s.employee_id
               WHERE s.employee_id = ?1
               ORDER BY s.year DESC, s.month DESC"#,
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await
    }

    pub async fn breakdown(
        pool: &SqlitePool,
        salary_id: Uuid,
    ) -> Result<Option<SalaryBreakdown>, sqlx::Error> {
        let Some(row) = sqlx::query_as::<_, SalaryEmployeeRow>(
            r#"SELECT s.*, e.employee_name AS employee_name, e.email AS email
               FROM salaries s
               JOIN employees e ON e.id = s.employee_id
               WHERE s.id = ?1"#,
        )
        .bind(salary_id)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let details = SalaryDetail::find_by_salary_id(pool, salary_id).await?;

        Ok(Some(SalaryBreakdown {
            salary: row.salary,
            employee_name: row.employee_name,
            email: row.email,
            details,
        }))
    }
}

impl SalaryDetail {
    pub async fn insert<'e, E>(
        executor: E,
        id: Uuid,
        salary_id: Uuid,
        job_id: Uuid,
        quantity: i64,
        pay_per_unit: f64,
        subtotal: f64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, SalaryDetail>(
            r#"INSERT INTO salary_details
                   (id, salary_id, job_id, quantity, pay_per_unit, subtotal)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(salary_id)
        .bind(job_id)
        .bind(quantity)
        .bind(pay_per_unit)
        .bind(subtotal)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_salary_id(
        pool: &SqlitePool,
        salary_id: Uuid,
    ) -> Result<Vec<SalaryDetailLine>, sqlx::Error> {
        sqlx::query_as::<_, SalaryDetailLine>(
            r#"SELECT d.*, j.job_name AS job_name
               FROM salary_details d
               JOIN jobs j ON j.id = d.job_id
               WHERE d.salary_id = ?1"#,
        )
        .bind(salary_id)
        .fetch_all(pool)
        .await
    }
}
