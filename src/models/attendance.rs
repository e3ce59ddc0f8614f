//! Attendance event and work period models.
//!
//! An [`AttendanceEvent`] is one clock-in or clock-out. Pairs of events form
//! a [`WorkPeriod`], and the periods inside a payroll window are summarised
//! by [`WorkedDuration`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Whether an event opens or closes a work period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Clock-in.
    Entry,
    /// Clock-out.
    Exit,
}

impl EventKind {
    /// Returns the storage and wire representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Entry => "ENTRY",
            EventKind::Exit => "EXIT",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRY" => Ok(EventKind::Entry),
            "EXIT" => Ok(EventKind::Exit),
            other => Err(format!("unknown attendance event kind '{}'", other)),
        }
    }
}

/// A recorded clock-in or clock-out. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Ledger-assigned identifier; increases with recording order.
    pub id: i64,
    /// The employee the event belongs to.
    pub employee_id: i64,
    /// Entry or exit.
    pub kind: EventKind,
    /// When the employee clocked in or out.
    pub occurred_at: DateTime<Utc>,
    /// When the ledger stored the event.
    pub recorded_at: DateTime<Utc>,
}

/// One closed (entry, exit) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPeriod {
    /// The employee who worked the period.
    pub employee_id: i64,
    /// Clock-in time.
    pub entry: DateTime<Utc>,
    /// Clock-out time, never before `entry`.
    pub exit: DateTime<Utc>,
}

impl WorkPeriod {
    /// Returns the elapsed time between entry and exit.
    pub fn duration(&self) -> Duration {
        self.exit - self.entry
    }

    /// Returns the worked hours as an exact Decimal.
    ///
    /// # Examples
    ///
    /// ```
    /// use chango_payroll::models::WorkPeriod;
    /// use chrono::{DateTime, Utc};
    /// use rust_decimal::Decimal;
    ///
    /// let period = WorkPeriod {
    ///     employee_id: 1,
    ///     entry: "2026-03-02T09:00:00Z".parse::<DateTime<Utc>>().unwrap(),
    ///     exit: "2026-03-02T17:30:00Z".parse::<DateTime<Utc>>().unwrap(),
    /// };
    /// assert_eq!(period.hours(), Decimal::new(85, 1)); // 8.5 hours
    /// ```
    pub fn hours(&self) -> Decimal {
        millis_to_hours(self.duration().num_milliseconds())
    }

    /// Returns the UTC calendar date the period started on.
    pub fn work_date(&self) -> NaiveDate {
        self.entry.date_naive()
    }
}

/// The closed work periods of one employee inside a payroll window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedDuration {
    /// The employee.
    pub employee_id: i64,
    /// Closed periods whose entry lies in the window, oldest first.
    pub periods: Vec<WorkPeriod>,
    /// Sum of all period durations in hours, unrounded.
    pub total_hours: Decimal,
    /// True when an entry inside the window has no matching exit yet.
    pub has_open_period: bool,
    /// The timestamp of that unmatched entry, if any.
    pub open_entry: Option<DateTime<Utc>>,
}

impl WorkedDuration {
    /// Builds the summary from already-paired periods.
    pub fn from_periods(
        employee_id: i64,
        periods: Vec<WorkPeriod>,
        open_entry: Option<DateTime<Utc>>,
    ) -> Self {
        let total_millis: i64 = periods
            .iter()
            .map(|p| p.duration().num_milliseconds())
            .sum();

        Self {
            employee_id,
            periods,
            total_hours: millis_to_hours(total_millis),
            has_open_period: open_entry.is_some(),
            open_entry,
        }
    }

    /// Number of distinct UTC dates on which a closed period started.
    pub fn days_worked(&self) -> u32 {
        let days: BTreeSet<NaiveDate> = self.periods.iter().map(WorkPeriod::work_date).collect();
        days.len() as u32
    }
}

/// Attendance counters for one UTC calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    /// The date the counters cover.
    pub date: NaiveDate,
    /// Entries recorded for the date.
    pub entries: i64,
    /// Exits recorded for the date.
    pub exits: i64,
    /// Distinct employees with at least one event on the date.
    pub employees: i64,
    /// Employees whose latest event is an entry made on the date.
    pub open_entries: i64,
}

/// Converts milliseconds into hours without rounding.
fn millis_to_hours(millis: i64) -> Decimal {
    (Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR)).normalize()
}
