//! Pairing of attendance events into work periods.
//!
//! The ledger stores raw ENTRY and EXIT events. This module walks one
//! employee's events in recording order and produces the closed periods that
//! start inside a payroll window, flagging an entry that is still open.

use chrono::{DateTime, Utc};

use crate::models::{AttendanceEvent, EventKind, WorkPeriod, WorkedDuration};

/// Pairs one employee's events into closed work periods.
///
/// `events` must be in recording order. Only periods whose entry falls in
/// `[window_start, window_end)` are returned. An entry in the window without
/// an exit sets `has_open_period`; such a period is never counted. An exit
/// whose entry precedes the window is ignored.
///
/// # Examples
///
/// ```
/// use chango_payroll::calculation::pair_events;
/// use chango_payroll::models::{AttendanceEvent, EventKind};
/// use chrono::{DateTime, Utc};
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
/// let event = |id, kind, ts: &str| AttendanceEvent {
///     id,
///     employee_id: 1,
///     kind,
///     occurred_at: at(ts),
///     recorded_at: at(ts),
/// };
///
/// let events = vec![
///     event(1, EventKind::Entry, "2026-03-02T09:00:00Z"),
///     event(2, EventKind::Exit, "2026-03-02T17:00:00Z"),
///     event(3, EventKind::Entry, "2026-03-03T09:00:00Z"),
/// ];
///
/// let worked = pair_events(1, &events, at("2026-03-01T00:00:00Z"), at("2026-04-01T00:00:00Z"));
/// assert_eq!(worked.periods.len(), 1);
/// assert_eq!(worked.total_hours, Decimal::from(8));
/// assert!(worked.has_open_period);
/// ```
pub fn pair_events(
    employee_id: i64,
    events: &[AttendanceEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> WorkedDuration {
    let in_window = |ts: DateTime<Utc>| ts >= window_start && ts < window_end;

    let mut periods = Vec::new();
    let mut open_entry: Option<DateTime<Utc>> = None;

    for event in events.iter().filter(|e| e.employee_id == employee_id) {
        match event.kind {
            EventKind::Entry => open_entry = Some(event.occurred_at),
            EventKind::Exit => {
                if let Some(entry) = open_entry.take() {
                    if in_window(entry) && event.occurred_at >= entry {
                        periods.push(WorkPeriod {
                            employee_id,
                            entry,
                            exit: event.occurred_at,
                        });
                    }
                }
            }
        }
    }

    WorkedDuration::from_periods(employee_id, periods, open_entry.filter(|e| in_window(*e)))
}
