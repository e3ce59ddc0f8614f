//! Stateful services over the SQLite store.
//!
//! - [`EmployeeDirectory`]: employee records
//! - [`AttendanceLedger`]: the append-only ENTRY/EXIT log
//! - [`ReceiptLifecycle`]: receipt storage and signing
//! - [`PayrollCalculator`]: receipt generation
//!
//! All of them are cheap to clone; clones share the same pool.

mod directory;
mod ledger;
mod payroll;
mod receipts;

pub use directory::EmployeeDirectory;
pub use ledger::AttendanceLedger;
pub use payroll::PayrollCalculator;
pub use receipts::ReceiptLifecycle;
