//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the attendance ledger, payroll calculator and receipt
//! lifecycle can report.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Every variant except [`EngineError::Storage`] is a deterministic
/// consequence of the input or the stored state and is never retried.
///
/// # Example
///
/// ```
/// use chango_payroll::error::EngineError;
///
/// let error = EngineError::UnknownRole {
///     role: "Astronauta".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown role: Astronauta");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An entry or exit would break the ENTRY, EXIT alternation.
    #[error("Invalid attendance sequence for employee {employee_id} at {timestamp}: {message}")]
    InvalidSequence {
        /// The employee whose ledger rejected the event.
        employee_id: i64,
        /// The timestamp of the rejected event.
        timestamp: DateTime<Utc>,
        /// What was wrong with the sequence.
        message: String,
    },

    /// The payroll window still contains an entry without a matching exit.
    #[error("Incomplete attendance for employee {employee_id} between {period_start} and {period_end}")]
    IncompleteAttendance {
        /// The employee being payrolled.
        employee_id: i64,
        /// Start of the payroll window (inclusive).
        period_start: NaiveDate,
        /// End of the payroll window (exclusive).
        period_end: NaiveDate,
    },

    /// The role has no base salary in the rate table.
    #[error("Unknown role: {role}")]
    UnknownRole {
        /// The role that was not found.
        role: String,
    },

    /// The employee directory has no such employee.
    #[error("Unknown employee: {employee_id}")]
    UnknownEmployee {
        /// The id that was looked up.
        employee_id: i64,
    },

    /// The employee's status forbids clocking in.
    #[error("Employee {employee_id} is {status} and cannot record attendance")]
    InactiveEmployee {
        /// The employee id.
        employee_id: i64,
        /// The employee's current status.
        status: String,
    },

    /// The receipt was already signed.
    #[error("Receipt {receipt_id} is already signed")]
    AlreadySigned {
        /// The receipt id.
        receipt_id: i64,
    },

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record ("Receipt", "Employee").
        entity: &'static str,
        /// The id that was looked up.
        id: i64,
    },

    /// The payroll period is empty, reversed or spans several months.
    #[error("Invalid period {period_start} to {period_end}: {message}")]
    InvalidPeriod {
        /// Start of the period.
        period_start: NaiveDate,
        /// End of the period.
        period_end: NaiveDate,
        /// A description of what made the period invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The store failed; propagated unchanged for an outer layer to handle.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl EngineError {
    /// Shorthand for a missing receipt.
    pub fn receipt_not_found(id: i64) -> Self {
        EngineError::NotFound {
            entity: "Receipt",
            id,
        }
    }

    /// Shorthand for a missing employee record.
    pub fn employee_not_found(id: i64) -> Self {
        EngineError::NotFound {
            entity: "Employee",
            id,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
