//! Pure projection functions over (Job, Assignment).
//!
//! Derived fields are never persisted; every read path computes them through
//! these functions so the dashboard and the employee task list cannot
//! disagree.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::assignment::AssignmentStatus;

/// Read-time status label for an assignment as shown to employees.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProgressLabel {
    Completed,
    InProgress,
    Rejected,
    Pending,
}

impl ProgressLabel {
    /// Display order: active work first, exhausted jobs near the end.
    pub fn sort_rank(self) -> u8 {
        match self {
            ProgressLabel::InProgress => 1,
            ProgressLabel::Rejected => 2,
            ProgressLabel::Completed => 3,
            ProgressLabel::Pending => 4,
        }
    }
}

/// Label for an assignment: the job being exhausted trumps everything,
/// otherwise the label mirrors the assignment status.
pub fn progress_label(job_is_active: bool, status: AssignmentStatus) -> ProgressLabel {
    if !job_is_active {
        return ProgressLabel::Completed;
    }
    match status {
        AssignmentStatus::Accepted => ProgressLabel::InProgress,
        AssignmentStatus::Rejected => ProgressLabel::Rejected,
        AssignmentStatus::Pending => ProgressLabel::Pending,
    }
}

/// Earnings for finished units. Recomputed at read time and at
/// salary-creation time, never stored on the assignment row.
pub fn earned_amount(completed_quantity: i64, pay_per_unit: f64) -> f64 {
    completed_quantity as f64 * pay_per_unit
}

/// Units still open within one employee's own reservation. Distinct from the
/// job-level remaining capacity.
pub fn remaining_allocation(assigned_quantity: i64, completed_quantity: i64) -> i64 {
    assigned_quantity - completed_quantity
}
