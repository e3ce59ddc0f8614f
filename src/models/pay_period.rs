//! Pay period model.
//!
//! A [`PayPeriod`] is a half-open range of calendar dates, `[start_date,
//! end_date)`, interpreted in UTC. A whole month is written as the first of
//! the month to the first of the next month.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a payroll period.
///
/// # Example
///
/// ```
/// use chango_payroll::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let march = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
/// )
/// .unwrap();
///
/// assert!(march.is_full_month());
/// assert_eq!(march.days(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The day after the last day of the period (exclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a validated pay period.
    ///
    /// Fails with `InvalidPeriod` when the range is empty or reversed, or when
    /// it reaches past the end of the month it starts in.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        let period = Self {
            start_date,
            end_date,
        };
        period.validate()?;
        Ok(period)
    }

    /// Checks the period invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date <= self.start_date {
            return Err(self.invalid("end date must be after start date"));
        }

        let next_month = self
            .next_month_start()
            .ok_or_else(|| self.invalid("start date is out of range"))?;
        if self.end_date > next_month {
            return Err(self.invalid("a pay period must not span more than one calendar month"));
        }
        Ok(())
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidPeriod {
            period_start: self.start_date,
            period_end: self.end_date,
            message: message.to_string(),
        }
    }

    fn month_start(&self) -> NaiveDate {
        self.start_date - chrono::Days::new(u64::from(self.start_date.day0()))
    }

    fn next_month_start(&self) -> Option<NaiveDate> {
        self.month_start().checked_add_months(Months::new(1))
    }

    /// Returns true if the period is exactly one calendar month.
    pub fn is_full_month(&self) -> bool {
        self.start_date.day() == 1 && Some(self.end_date) == self.next_month_start()
    }

    /// Number of calendar days in the period.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Number of days in the month the period falls in.
    pub fn days_in_month(&self) -> i64 {
        self.next_month_start()
            .map(|next| (next - self.month_start()).num_days())
            .unwrap_or(31)
    }

    /// Fraction of the month the period covers, `1` for a full month.
    pub fn month_fraction(&self) -> Decimal {
        if self.is_full_month() {
            return Decimal::ONE;
        }
        Decimal::from(self.days()) / Decimal::from(self.days_in_month())
    }

    /// Checks if a date falls within the period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date < self.end_date
    }

    /// Returns the period as a half-open UTC instant range.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start_date.and_time(NaiveTime::MIN).and_utc(),
            self.end_date.and_time(NaiveTime::MIN).and_utc(),
        )
    }
}
