mod common;

use std::time::Duration;

use common::*;
use services::services::ledger::{ClaimOutcome, JobLedger, LedgerError};
use uuid::Uuid;

/// Retry the whole claim while the store reports lock contention; the
/// operation is documented as safe to rerun from the top.
async fn claim_until_settled(
    ledger: JobLedger,
    employee_id: Uuid,
    job_id: Uuid,
    quantity: i64,
) -> Result<ClaimOutcome, LedgerError> {
    for _ in 0..50 {
        match ledger.claim(employee_id, job_id, &accept(quantity)).await {
            Err(err) if err.is_retryable() => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            settled => return settled,
        }
    }
    panic!("claim kept conflicting after 50 retries");
}

#[tokio::test]
async fn racing_claims_never_over_allocate() {
    let t = test_db().await;
    let a = seed_employee(&t.db, "Amara Perera").await;
    let b = seed_employee(&t.db, "Bimal Silva").await;
    let job = seed_job(&t.db, "Rush order", 10, 1.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let first = tokio::spawn(claim_until_settled(ledger.clone(), a.id, job.id, 6));
    let second = tokio::spawn(claim_until_settled(ledger.clone(), b.id, job.id, 6));

    let results = [first.await.unwrap(), second.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let refusals = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InsufficientCapacity)))
        .count();
    assert_eq!(successes, 1, "exactly one of the racing claims may win");
    assert_eq!(refusals, 1, "the loser must see the capacity refusal");

    let winner = results.iter().flatten().next().unwrap();
    assert_eq!(winner.remaining_quantity, 4);
    assert_ledger_conserved(&t.db, job.id).await;
}

#[tokio::test]
async fn many_racing_claims_respect_the_ledger() {
    let t = test_db().await;
    let job = seed_job(&t.db, "Bulk order", 100, 1.0).await;
    let ledger = JobLedger::new(t.db.pool.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let employee = seed_employee(&t.db, &format!("Worker {i}")).await;
        handles.push(tokio::spawn(claim_until_settled(
            ledger.clone(),
            employee.id,
            job.id,
            30,
        )));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(LedgerError::InsufficientCapacity | LedgerError::JobInactive) => {}
            Err(other) => panic!("unexpected claim failure: {other}"),
        }
    }

    // 100 units at 30 apiece: exactly three reservations fit.
    assert_eq!(successes, 3);
    assert_ledger_conserved(&t.db, job.id).await;
}
