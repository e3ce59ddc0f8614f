//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ConfigLoader;
use crate::services::{AttendanceLedger, EmployeeDirectory, PayrollCalculator, ReceiptLifecycle};

/// Shared application state.
///
/// Holds the loaded payroll configuration and the services built over one
/// connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    directory: EmployeeDirectory,
    ledger: AttendanceLedger,
    receipts: ReceiptLifecycle,
    payroll: PayrollCalculator,
}

impl AppState {
    /// Wires the services over `pool`.
    pub fn new(pool: SqlitePool, config: ConfigLoader) -> Self {
        let config = Arc::new(config);
        let directory = EmployeeDirectory::new(pool.clone());
        let ledger = AttendanceLedger::new(pool.clone(), directory.clone());
        let receipts = ReceiptLifecycle::new(pool);
        let payroll = PayrollCalculator::new(
            directory.clone(),
            ledger.clone(),
            receipts.clone(),
            Arc::clone(&config),
        );

        Self {
            config,
            directory,
            ledger,
            receipts,
            payroll,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The employee directory.
    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    /// The attendance ledger.
    pub fn ledger(&self) -> &AttendanceLedger {
        &self.ledger
    }

    /// The receipt lifecycle manager.
    pub fn receipts(&self) -> &ReceiptLifecycle {
        &self.receipts
    }

    /// The payroll calculator.
    pub fn payroll(&self) -> &PayrollCalculator {
        &self.payroll
    }
}
