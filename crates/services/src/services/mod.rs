pub mod ledger;
pub mod payroll;
