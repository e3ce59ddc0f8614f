//! Payroll receipt models.
//!
//! This module contains the [`PayrollReceipt`] type, its computed
//! [`ReceiptLines`] and the [`ReceiptState`] lifecycle enum.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a receipt.
///
/// The only transition is `Generated -> Signed`; `Signed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptState {
    /// Computed and stored, awaiting signature.
    Generated,
    /// Signed by an operator; frozen.
    Signed,
}

impl ReceiptState {
    /// Returns the storage and wire representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptState::Generated => "GENERATED",
            ReceiptState::Signed => "SIGNED",
        }
    }
}

impl fmt::Display for ReceiptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERATED" => Ok(ReceiptState::Generated),
            "SIGNED" => Ok(ReceiptState::Signed),
            other => Err(format!("unknown receipt state '{}'", other)),
        }
    }
}

/// The computed line items of a receipt.
///
/// Hour fields are exact. Money fields are rounded half-up to the cent; the
/// total is rounded once from the unrounded components, so it may differ by
/// a cent from the sum of the presented components. `total` is the amount
/// payable; the component lines are informational.
///
/// # Example
///
/// ```
/// use chango_payroll::models::ReceiptLines;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let lines = ReceiptLines {
///     worked_hours: Decimal::from(170),
///     regular_hours: Decimal::from(160),
///     overtime_50_hours: Decimal::from(10),
///     overtime_100_hours: Decimal::ZERO,
///     days_worked: 17,
///     base_salary: Decimal::from_str("1200.00").unwrap(),
///     hourly_rate: Decimal::from_str("7.50").unwrap(),
///     base_pay: Decimal::from_str("1200.00").unwrap(),
///     overtime_pay_50: Decimal::from_str("112.50").unwrap(),
///     overtime_pay_100: Decimal::from_str("0.00").unwrap(),
///     total: Decimal::from_str("1312.50").unwrap(),
/// };
/// assert_eq!(lines.overtime_pay(), Decimal::from_str("112.50").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLines {
    /// All closed hours in the period.
    pub worked_hours: Decimal,
    /// Hours up to the standard threshold.
    pub regular_hours: Decimal,
    /// Hours paid with a 50% premium.
    pub overtime_50_hours: Decimal,
    /// Hours paid with a 100% premium.
    pub overtime_100_hours: Decimal,
    /// Distinct dates with a closed period.
    pub days_worked: u32,
    /// Base monthly salary of the role at generation time.
    pub base_salary: Decimal,
    /// `base_salary / standard_monthly_hours`, to four decimal places.
    pub hourly_rate: Decimal,
    /// Base pay, prorated for partial months.
    pub base_pay: Decimal,
    /// Pay for the 50% band.
    pub overtime_pay_50: Decimal,
    /// Pay for the 100% band.
    pub overtime_pay_100: Decimal,
    /// Gross total payable; authoritative over the sum of the rounded lines.
    pub total: Decimal,
}

impl ReceiptLines {
    /// Returns the sum of both overtime bands.
    pub fn overtime_pay(&self) -> Decimal {
        self.overtime_pay_50 + self.overtime_pay_100
    }
}

/// A receipt ready to be stored; the lifecycle manager assigns its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReceipt {
    /// The employee being paid.
    pub employee_id: i64,
    /// The role the receipt was computed for.
    pub role: String,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Day after the period (exclusive).
    pub period_end: NaiveDate,
    /// Computed line items.
    pub lines: ReceiptLines,
}

/// A stored payroll receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReceipt {
    /// Receipt identifier.
    pub id: i64,
    /// The employee being paid.
    pub employee_id: i64,
    /// The role the receipt was computed for.
    pub role: String,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Day after the period (exclusive).
    pub period_end: NaiveDate,
    /// Computed line items.
    #[serde(flatten)]
    pub lines: ReceiptLines,
    /// Lifecycle state.
    pub state: ReceiptState,
    /// Operator who signed, set only when signed.
    pub signed_by: Option<i64>,
    /// Signing time, set only when signed.
    pub signed_at: Option<DateTime<Utc>>,
    /// When the receipt was generated.
    pub generated_at: DateTime<Utc>,
}

impl PayrollReceipt {
    /// Returns true once the receipt has been signed.
    pub fn is_signed(&self) -> bool {
        self.state == ReceiptState::Signed
    }
}
