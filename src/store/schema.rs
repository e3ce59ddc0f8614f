//! Table, index and trigger definitions.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::EngineResult;

/// Creates all tables, indexes and triggers. Safe to call repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> EngineResult<()> {
    create_employees_table(pool).await?;
    create_attendance_events_table(pool).await?;
    create_payroll_receipts_table(pool).await?;
    debug!("Schema ready");
    Ok(())
}

async fn create_employees_table(pool: &SqlitePool) -> EngineResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'inactive', 'on_leave')),
            schedule TEXT NOT NULL DEFAULT '',
            email TEXT,
            phone TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Employees leave through a status change.
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS employees_no_delete
        BEFORE DELETE ON employees
        BEGIN
            SELECT RAISE(ABORT, 'employees are never deleted');
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_attendance_events_table(pool: &SqlitePool) -> EngineResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            kind TEXT NOT NULL CHECK (kind IN ('ENTRY', 'EXIT')),
            occurred_at_ms INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attendance_events_employee \
         ON attendance_events (employee_id, id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attendance_events_occurred \
         ON attendance_events (occurred_at_ms)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS attendance_events_no_update
        BEFORE UPDATE ON attendance_events
        BEGIN
            SELECT RAISE(ABORT, 'attendance events are append-only');
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS attendance_events_no_delete
        BEFORE DELETE ON attendance_events
        BEGIN
            SELECT RAISE(ABORT, 'attendance events are append-only');
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_payroll_receipts_table(pool: &SqlitePool) -> EngineResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payroll_receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            role TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            worked_hours TEXT NOT NULL,
            regular_hours TEXT NOT NULL,
            overtime_50_hours TEXT NOT NULL,
            overtime_100_hours TEXT NOT NULL,
            days_worked INTEGER NOT NULL,
            base_salary TEXT NOT NULL,
            hourly_rate TEXT NOT NULL,
            base_pay TEXT NOT NULL,
            overtime_pay_50 TEXT NOT NULL,
            overtime_pay_100 TEXT NOT NULL,
            total TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'GENERATED'
                CHECK (state IN ('GENERATED', 'SIGNED')),
            signed_by INTEGER,
            signed_at TEXT,
            generated_at TEXT NOT NULL,
            CHECK ((state = 'SIGNED') = (signed_by IS NOT NULL AND signed_at IS NOT NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_payroll_receipts_employee \
         ON payroll_receipts (employee_id, period_start DESC, id DESC)",
    )
    .execute(pool)
    .await?;

    // A signed receipt is frozen.
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS payroll_receipts_signed_immutable
        BEFORE UPDATE ON payroll_receipts
        WHEN OLD.state = 'SIGNED'
        BEGIN
            SELECT RAISE(ABORT, 'signed receipts are immutable');
        END
        "#,
    )
    .execute(pool)
    .await?;

    // Line items never change, even before signing; regeneration makes a new row.
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS payroll_receipts_lines_immutable
        BEFORE UPDATE OF employee_id, role, period_start, period_end, worked_hours,
            regular_hours, overtime_50_hours, overtime_100_hours, days_worked,
            base_salary, hourly_rate, base_pay, overtime_pay_50, overtime_pay_100,
            total, generated_at
        ON payroll_receipts
        BEGIN
            SELECT RAISE(ABORT, 'receipt line items are immutable');
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS payroll_receipts_no_delete
        BEFORE DELETE ON payroll_receipts
        BEGIN
            SELECT RAISE(ABORT, 'receipts are never deleted');
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
