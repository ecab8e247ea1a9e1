pub mod assignment;
pub mod employee;
pub mod job;
pub mod projection;
pub mod salary;
