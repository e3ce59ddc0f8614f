//! Payroll generation.
//!
//! Glues the directory, the ledger and the receipt store to the pure
//! calculation in [`crate::calculation`].

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::calculation::build_receipt;
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{PayPeriod, PayrollReceipt};

use super::{AttendanceLedger, EmployeeDirectory, ReceiptLifecycle};

/// Computes and stores payroll receipts.
#[derive(Debug, Clone)]
pub struct PayrollCalculator {
    directory: EmployeeDirectory,
    ledger: AttendanceLedger,
    receipts: ReceiptLifecycle,
    config: Arc<ConfigLoader>,
}

impl PayrollCalculator {
    /// Creates a calculator.
    pub fn new(
        directory: EmployeeDirectory,
        ledger: AttendanceLedger,
        receipts: ReceiptLifecycle,
        config: Arc<ConfigLoader>,
    ) -> Self {
        Self {
            directory,
            ledger,
            receipts,
            config,
        }
    }

    /// Generates a GENERATED receipt for `[period_start, period_end)`.
    ///
    /// The role is the employee's current role in the directory. Errors, in
    /// the order they are checked:
    ///
    /// - `UnknownEmployee` if the employee does not exist
    /// - `InvalidPeriod` if the range is empty or spans more than one month
    /// - `IncompleteAttendance` if an entry in the window has no exit
    /// - `UnknownRole` if the role has no base salary
    ///
    /// Generating twice for the same period stores two receipts with
    /// identical line items.
    pub async fn generate_receipt(
        &self,
        employee_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> EngineResult<PayrollReceipt> {
        let employee = self.directory.require(employee_id).await?;
        let period = PayPeriod::new(period_start, period_end)?;

        let (window_start, window_end) = period.window();
        let worked = self
            .ledger
            .compute_worked_duration(employee_id, window_start, window_end)
            .await?;

        let new_receipt =
            match build_receipt(employee_id, &employee.role, &period, &worked, &self.config) {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!(employee_id, %period_start, %period_end, error = %e, "Receipt not generated");
                    return Err(e);
                }
            };

        let receipt = self.receipts.insert(new_receipt).await?;
        info!(
            receipt_id = receipt.id,
            employee_id,
            role = %receipt.role,
            worked_hours = %receipt.lines.worked_hours,
            total = %receipt.lines.total,
            "Receipt generated"
        );
        Ok(receipt)
    }
}
