#![allow(dead_code)]

use db::{
    DBService,
    models::{
        assignment::AssignmentStatus,
        employee::{CreateEmployee, Employee},
        job::{CreateJob, Job},
    },
};
use services::services::ledger::ClaimRequest;
use tempfile::TempDir;
use uuid::Uuid;

/// Fresh migrated database on a temp file. The directory must outlive the
/// pool, so it rides along.
pub struct TestDb {
    pub db: DBService,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = DBService::new(&url).await.expect("open test database");
    TestDb { db, _dir: dir }
}

pub async fn seed_employee(db: &DBService, name: &str) -> Employee {
    Employee::create(
        &db.pool,
        Uuid::new_v4(),
        &CreateEmployee {
            employee_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: None,
        },
    )
    .await
    .expect("seed employee")
}

pub async fn seed_job(db: &DBService, name: &str, quantity: i64, pay_per_unit: f64) -> Job {
    Job::create(
        &db.pool,
        Uuid::new_v4(),
        &CreateJob {
            job_name: name.to_string(),
            description: None,
            start_date: None,
            end_date: None,
            quantity,
            pay_per_unit,
            design_image: None,
        },
    )
    .await
    .expect("seed job")
}

pub fn accept(quantity: i64) -> ClaimRequest {
    ClaimRequest {
        decision: AssignmentStatus::Accepted,
        requested_quantity: quantity,
        completion_fraction: None,
    }
}

pub fn reject() -> ClaimRequest {
    ClaimRequest {
        decision: AssignmentStatus::Rejected,
        requested_quantity: 0,
        completion_fraction: None,
    }
}

/// The capacity ledger invariant: accepted reservations plus remaining
/// capacity always equal the job's original quantity.
pub async fn assert_ledger_conserved(db: &DBService, job_id: Uuid) {
    let job = Job::find_by_id(&db.pool, job_id)
        .await
        .expect("fetch job")
        .expect("job exists");
    let (accepted_total,): (i64,) = sqlx::query_as(
        r#"SELECT COALESCE(SUM(assigned_quantity), 0)
           FROM employee_job_assignments
           WHERE job_id = ?1 AND status = 'accepted'"#,
    )
    .bind(job_id)
    .fetch_one(&db.pool)
    .await
    .expect("sum accepted");
    assert_eq!(
        accepted_total + job.remaining_quantity,
        job.quantity,
        "accepted reservations plus remaining capacity must equal quantity"
    );
}
