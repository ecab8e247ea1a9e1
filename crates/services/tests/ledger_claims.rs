mod common;

use common::*;
use db::models::{
    assignment::{Assignment, AssignmentStatus},
    job::Job,
};
use services::services::ledger::{ClaimRequest, JobLedger, LedgerError};
use uuid::Uuid;

#[tokio::test]
async fn first_claim_reserves_capacity() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Banner print run", 100, 5.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let outcome = ledger.claim(employee.id, job.id, &accept(30)).await.unwrap();

    assert_eq!(outcome.remaining_quantity, 70);
    assert!(outcome.is_active);
    assert_eq!(outcome.assignment.status, AssignmentStatus::Accepted);
    assert_eq!(outcome.assignment.assigned_quantity, 30);
    assert_eq!(outcome.assignment.completed_quantity, 0);
    assert_ledger_conserved(&t.db, job.id).await;
}

#[tokio::test]
async fn exhausting_capacity_deactivates_the_job() {
    let t = test_db().await;
    let a = seed_employee(&t.db, "Amara Perera").await;
    let b = seed_employee(&t.db, "Bimal Silva").await;
    let job = seed_job(&t.db, "Mug decals", 100, 2.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    ledger.claim(a.id, job.id, &accept(30)).await.unwrap();
    let outcome = ledger.claim(b.id, job.id, &accept(70)).await.unwrap();

    assert_eq!(outcome.remaining_quantity, 0);
    assert!(!outcome.is_active);
    assert_ledger_conserved(&t.db, job.id).await;

    // Once exhausted, no claim path exists at all.
    let c = seed_employee(&t.db, "Chamodi Herath").await;
    let err = ledger.claim(c.id, job.id, &accept(1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::JobInactive));
}

#[tokio::test]
async fn over_allocation_is_rejected_and_rolled_back() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Sticker sheets", 10, 1.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let err = ledger.claim(employee.id, job.id, &accept(12)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientCapacity));

    let fresh = Job::find_by_id(&t.db.pool, job.id).await.unwrap().unwrap();
    assert_eq!(fresh.remaining_quantity, 10);
    assert!(fresh.is_active);

    // The whole claim rolled back: no assignment row was left behind.
    let assignment = Assignment::find_by_employee_and_job(&t.db.pool, employee.id, job.id)
        .await
        .unwrap();
    assert!(assignment.is_none());
}

#[tokio::test]
async fn accepted_reclaim_accumulates_quantity() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Tote bags", 100, 3.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    ledger.claim(employee.id, job.id, &accept(30)).await.unwrap();
    let outcome = ledger.claim(employee.id, job.id, &accept(20)).await.unwrap();

    assert_eq!(outcome.assignment.assigned_quantity, 50);
    assert_eq!(outcome.remaining_quantity, 50);
    assert_ledger_conserved(&t.db, job.id).await;
}

#[tokio::test]
async fn accepted_decision_is_sticky() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Flyers", 100, 0.5).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    ledger.claim(employee.id, job.id, &accept(40)).await.unwrap();
    let err = ledger.claim(employee.id, job.id, &reject()).await.unwrap_err();

    assert_eq!(err.to_string(), "Cannot reject an already accepted job");

    // Nothing moved.
    let fresh = Job::find_by_id(&t.db.pool, job.id).await.unwrap().unwrap();
    assert_eq!(fresh.remaining_quantity, 60);
    let assignment = Assignment::find_by_employee_and_job(&t.db.pool, employee.id, job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assignment.status, AssignmentStatus::Accepted);
    assert_eq!(assignment.assigned_quantity, 40);
}

#[tokio::test]
async fn rejected_decision_is_sticky() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Posters", 100, 4.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    ledger.claim(employee.id, job.id, &reject()).await.unwrap();
    let err = ledger.claim(employee.id, job.id, &accept(10)).await.unwrap_err();

    assert_eq!(err.to_string(), "Cannot accept an already rejected job");
    let fresh = Job::find_by_id(&t.db.pool, job.id).await.unwrap().unwrap();
    assert_eq!(fresh.remaining_quantity, 100);
}

#[tokio::test]
async fn rejection_reserves_nothing_and_may_repeat() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Business cards", 100, 0.2).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let outcome = ledger.claim(employee.id, job.id, &reject()).await.unwrap();
    assert_eq!(outcome.assignment.status, AssignmentStatus::Rejected);
    assert_eq!(outcome.assignment.assigned_quantity, 0);
    assert_eq!(outcome.remaining_quantity, 100);

    // Repeating the same decision is a no-op, not an error.
    let outcome = ledger.claim(employee.id, job.id, &reject()).await.unwrap();
    assert_eq!(outcome.assignment.status, AssignmentStatus::Rejected);
    assert_eq!(outcome.remaining_quantity, 100);
    assert_ledger_conserved(&t.db, job.id).await;
}

#[tokio::test]
async fn remaining_quantity_never_increases() {
    let t = test_db().await;
    let a = seed_employee(&t.db, "Amara Perera").await;
    let b = seed_employee(&t.db, "Bimal Silva").await;
    let job = seed_job(&t.db, "Labels", 50, 1.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let mut last_remaining = 50;
    let steps: Vec<(Uuid, ClaimRequest)> = vec![
        (a.id, accept(10)),
        (b.id, reject()),
        (a.id, accept(0)),
        (a.id, accept(25)),
        (a.id, accept(100)), // fails: insufficient
        (b.id, reject()),    // no-op repeat
    ];
    for (employee_id, request) in steps {
        let _ = ledger.claim(employee_id, job.id, &request).await;
        let fresh = Job::find_by_id(&t.db.pool, job.id).await.unwrap().unwrap();
        assert!(fresh.remaining_quantity <= last_remaining);
        last_remaining = fresh.remaining_quantity;
    }
    assert_ledger_conserved(&t.db, job.id).await;
}

#[tokio::test]
async fn invalid_claims_are_refused_up_front() {
    let t = test_db().await;
    let employee = seed_employee(&t.db, "Amara Perera").await;
    let job = seed_job(&t.db, "Stencils", 10, 1.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let err = ledger
        .claim(employee.id, Uuid::new_v4(), &accept(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::JobNotFound));

    let err = ledger.claim(employee.id, job.id, &accept(-5)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let pending = ClaimRequest {
        decision: AssignmentStatus::Pending,
        requested_quantity: 1,
        completion_fraction: None,
    };
    let err = ledger.claim(employee.id, job.id, &pending).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}
