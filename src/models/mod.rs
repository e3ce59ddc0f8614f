//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod employee;
mod pay_period;
mod receipt;

pub use attendance::{AttendanceEvent, AttendanceStats, EventKind, WorkPeriod, WorkedDuration};
pub use employee::{
    Employee, EmployeeStats, EmployeeUpdate, EmploymentStatus, NewEmployee, RoleCount,
};
pub use pay_period::PayPeriod;
pub use receipt::{NewReceipt, PayrollReceipt, ReceiptLines, ReceiptState};
