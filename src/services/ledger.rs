//! Attendance ledger.
//!
//! An append-only log of clock-in and clock-out events. Per employee the
//! events alternate ENTRY, EXIT, ENTRY, ... and never go back in time. Each
//! append is a single conditional `INSERT ... SELECT` against the employee's
//! latest event, so two racing requests cannot both open (or both close) a
//! period.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::calculation::pair_events;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEvent, AttendanceStats, EventKind, WorkedDuration};
use crate::store::decode_error;

use super::EmployeeDirectory;

const EVENT_COLUMNS: &str = "id, employee_id, kind, occurred_at_ms, recorded_at";

/// The attendance event log.
#[derive(Debug, Clone)]
pub struct AttendanceLedger {
    pool: SqlitePool,
    directory: EmployeeDirectory,
}

impl AttendanceLedger {
    /// Creates a ledger over the given pool.
    pub fn new(pool: SqlitePool, directory: EmployeeDirectory) -> Self {
        Self { pool, directory }
    }

    /// Records a clock-in.
    ///
    /// Fails with `UnknownEmployee` for an id the directory does not know,
    /// `InactiveEmployee` unless the employee is active, and
    /// `InvalidSequence` when an entry is already open or `timestamp` is
    /// before the employee's last exit. The status and sequence checks are
    /// repeated inside the insert, so a concurrent deactivation is honoured.
    pub async fn record_entry(
        &self,
        employee_id: i64,
        timestamp: DateTime<Utc>,
    ) -> EngineResult<AttendanceEvent> {
        let employee = self.directory.require(employee_id).await?;
        if !employee.status.can_clock_in() {
            return Err(EngineError::InactiveEmployee {
                employee_id,
                status: employee.status.to_string(),
            });
        }

        let sql = format!(
            r#"
            INSERT INTO attendance_events (employee_id, kind, occurred_at_ms, recorded_at)
            SELECT ?1, 'ENTRY', ?2, ?3
            WHERE EXISTS (SELECT 1 FROM employees WHERE id = ?1 AND status = 'active')
              AND NOT EXISTS (
                SELECT 1 FROM attendance_events last
                WHERE last.id = (SELECT MAX(id) FROM attendance_events WHERE employee_id = ?1)
                  AND (last.kind = 'ENTRY' OR last.occurred_at_ms > ?2)
            )
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .bind(timestamp.timestamp_millis())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let event = event_from_row(&row)?;
                info!(employee_id, event_id = event.id, at = %event.occurred_at, "Entry recorded");
                Ok(event)
            }
            None => Err(self.rejected(employee_id, EventKind::Entry, timestamp).await?),
        }
    }

    /// Records a clock-out.
    ///
    /// Fails with `UnknownEmployee` for an id the directory does not know and
    /// `InvalidSequence` when there is no open entry or `timestamp` is before
    /// it. Employees who are no longer active may still clock out.
    pub async fn record_exit(
        &self,
        employee_id: i64,
        timestamp: DateTime<Utc>,
    ) -> EngineResult<AttendanceEvent> {
        self.directory.require(employee_id).await?;

        let sql = format!(
            r#"
            INSERT INTO attendance_events (employee_id, kind, occurred_at_ms, recorded_at)
            SELECT ?1, 'EXIT', ?2, ?3
            FROM attendance_events last
            WHERE last.id = (SELECT MAX(id) FROM attendance_events WHERE employee_id = ?1)
              AND last.kind = 'ENTRY'
              AND last.occurred_at_ms <= ?2
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .bind(timestamp.timestamp_millis())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let event = event_from_row(&row)?;
                info!(employee_id, event_id = event.id, at = %event.occurred_at, "Exit recorded");
                Ok(event)
            }
            None => Err(self.rejected(employee_id, EventKind::Exit, timestamp).await?),
        }
    }

    /// Explains why a conditional insert did not append anything.
    async fn rejected(
        &self,
        employee_id: i64,
        kind: EventKind,
        timestamp: DateTime<Utc>,
    ) -> EngineResult<EngineError> {
        if kind == EventKind::Entry {
            let employee = self.directory.require(employee_id).await?;
            if !employee.status.can_clock_in() {
                return Ok(EngineError::InactiveEmployee {
                    employee_id,
                    status: employee.status.to_string(),
                });
            }
        }

        let last = self.latest_event(employee_id).await?;

        let message = match (kind, last) {
            (EventKind::Entry, Some(last)) if last.kind == EventKind::Entry => {
                format!("entry already open since {}", last.occurred_at)
            }
            (EventKind::Entry, Some(last)) => {
                format!("entry is before the last exit at {}", last.occurred_at)
            }
            (EventKind::Exit, Some(last)) if last.kind == EventKind::Entry => {
                format!("exit is before the open entry at {}", last.occurred_at)
            }
            (EventKind::Exit, _) => "no open entry".to_string(),
            (EventKind::Entry, None) => "entry rejected".to_string(),
        };

        debug!(employee_id, %kind, %message, "Attendance event rejected");
        Ok(EngineError::InvalidSequence {
            employee_id,
            timestamp,
            message,
        })
    }

    async fn latest_event(&self, employee_id: i64) -> EngineResult<Option<AttendanceEvent>> {
        let sql = format!(
            "SELECT {} FROM attendance_events WHERE employee_id = ? ORDER BY id DESC LIMIT 1",
            EVENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    /// Summarises the closed work periods whose entry lies in `[start, end)`.
    ///
    /// A period that starts in the window and ends after it counts in full.
    /// An entry in the window with no exit yet sets `has_open_period`.
    pub async fn compute_worked_duration(
        &self,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<WorkedDuration> {
        self.directory.require(employee_id).await?;

        let sql = format!(
            "SELECT {} FROM attendance_events \
             WHERE employee_id = ? AND occurred_at_ms >= ? ORDER BY id",
            EVENT_COLUMNS
        );
        let events = sqlx::query(&sql)
            .bind(employee_id)
            .bind(start.timestamp_millis())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(event_from_row)
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(pair_events(employee_id, &events, start, end))
    }

    /// Returns an employee's events, oldest first, optionally bounded to
    /// `[from, to)`.
    pub async fn events_for_employee(
        &self,
        employee_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> EngineResult<Vec<AttendanceEvent>> {
        self.directory.require(employee_id).await?;

        let sql = format!(
            "SELECT {} FROM attendance_events \
             WHERE employee_id = ? \
               AND (? IS NULL OR occurred_at_ms >= ?) \
               AND (? IS NULL OR occurred_at_ms < ?) \
             ORDER BY id",
            EVENT_COLUMNS
        );
        let from_ms = from.map(|ts| ts.timestamp_millis());
        let to_ms = to.map(|ts| ts.timestamp_millis());
        let rows = sqlx::query(&sql)
            .bind(employee_id)
            .bind(from_ms)
            .bind(from_ms)
            .bind(to_ms)
            .bind(to_ms)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(event_from_row).collect()
    }

    /// Counts the events of one UTC calendar date.
    pub async fn daily_stats(&self, date: NaiveDate) -> EngineResult<AttendanceStats> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let start_ms = day_start.timestamp_millis();
        let end_ms = (day_start + chrono::Duration::days(1)).timestamp_millis();

        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(kind = 'ENTRY'), 0) AS entries,
                COALESCE(SUM(kind = 'EXIT'), 0) AS exits,
                COUNT(DISTINCT employee_id) AS employees
            FROM attendance_events
            WHERE occurred_at_ms >= ? AND occurred_at_ms < ?
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_one(&self.pool)
        .await?;

        let open_entries: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM attendance_events
            WHERE id IN (SELECT MAX(id) FROM attendance_events GROUP BY employee_id)
              AND kind = 'ENTRY'
              AND occurred_at_ms >= ? AND occurred_at_ms < ?
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceStats {
            date,
            entries: row.try_get("entries")?,
            exits: row.try_get("exits")?,
            employees: row.try_get("employees")?,
            open_entries,
        })
    }
}

fn event_from_row(row: &SqliteRow) -> EngineResult<AttendanceEvent> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<EventKind>()
        .map_err(|e| decode_error("kind", e))?;

    let occurred_at_ms: i64 = row.try_get("occurred_at_ms")?;
    let occurred_at = DateTime::from_timestamp_millis(occurred_at_ms)
        .ok_or_else(|| decode_error("occurred_at_ms", "timestamp out of range"))?;

    Ok(AttendanceEvent {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        kind,
        occurred_at,
        recorded_at: row.try_get("recorded_at")?,
    })
}
