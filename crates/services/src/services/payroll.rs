//! Salary creation from completed piecework.
//!
//! Freezes an employee's earnings for a month into a salary row plus
//! per-job detail lines, all in one transaction.

use db::models::{
    projection,
    salary::{Salary, SalaryDetail},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("Month must be between 1 and 12")]
    InvalidPeriod,
    #[error("Salary already created for this employee in the specified period")]
    SalaryExists,
    #[error("No completed jobs found for this employee in the specified period")]
    NoCompletedWork,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct CreateSalary {
    pub employee_id: Uuid,
    pub month: i64,
    pub year: i64,
    pub bonus: Option<f64>,
}

#[derive(Clone)]
pub struct Payroll {
    pool: SqlitePool,
}

impl Payroll {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateSalary) -> Result<Salary, PayrollError> {
        if !(1..=12).contains(&data.month) {
            return Err(PayrollError::InvalidPeriod);
        }

        let mut tx = self.pool.begin().await?;

        if Salary::exists_for_period(&mut *tx, data.employee_id, data.month, data.year).await? {
            return Err(PayrollError::SalaryExists);
        }

        let lines =
            Salary::completed_lines_for_period(&mut *tx, data.employee_id, data.month, data.year)
                .await?;
        if lines.is_empty() {
            return Err(PayrollError::NoCompletedWork);
        }

        let base_salary: f64 = lines
            .iter()
            .map(|line| projection::earned_amount(line.completed_quantity, line.pay_per_unit))
            .sum();
        let bonus = data.bonus.unwrap_or(0.0);
        let total_salary = base_salary + bonus;

        let salary = Salary::insert(
            &mut *tx,
            Uuid::new_v4(),
            data.employee_id,
            data.month,
            data.year,
            base_salary,
            bonus,
            total_salary,
        )
        .await?;

        for line in &lines {
            let subtotal = projection::earned_amount(line.completed_quantity, line.pay_per_unit);
            SalaryDetail::insert(
                &mut *tx,
                Uuid::new_v4(),
                salary.id,
                line.job_id,
                line.completed_quantity,
                line.pay_per_unit,
                subtotal,
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            salary_id = %salary.id,
            employee_id = %data.employee_id,
            month = data.month,
            year = data.year,
            base_salary,
            total_salary,
            "salary created"
        );

        Ok(salary)
    }
}
