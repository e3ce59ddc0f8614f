//! Receipt lifecycle.
//!
//! Owns receipt identity and the only state transition, `GENERATED ->
//! SIGNED`. Signing is one conditional UPDATE, so when several operators
//! sign the same receipt at once exactly one of them wins. Storage triggers
//! keep signed rows frozen.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{NewReceipt, PayrollReceipt, ReceiptLines, ReceiptState};
use crate::store::{decode_decimal, decode_error};

const RECEIPT_COLUMNS: &str = "id, employee_id, role, period_start, period_end, worked_hours, \
                               regular_hours, overtime_50_hours, overtime_100_hours, \
                               days_worked, base_salary, hourly_rate, base_pay, \
                               overtime_pay_50, overtime_pay_100, total, state, signed_by, \
                               signed_at, generated_at";

/// Stores receipts and performs the signing transition.
#[derive(Debug, Clone)]
pub struct ReceiptLifecycle {
    pool: SqlitePool,
}

impl ReceiptLifecycle {
    /// Creates a lifecycle manager over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a freshly computed receipt in the GENERATED state.
    pub async fn insert(&self, receipt: NewReceipt) -> EngineResult<PayrollReceipt> {
        let lines = &receipt.lines;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO payroll_receipts
                (employee_id, role, period_start, period_end, worked_hours, regular_hours,
                 overtime_50_hours, overtime_100_hours, days_worked, base_salary,
                 hourly_rate, base_pay, overtime_pay_50, overtime_pay_100, total,
                 state, generated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'GENERATED', ?)
            RETURNING id
            "#,
        )
        .bind(receipt.employee_id)
        .bind(&receipt.role)
        .bind(receipt.period_start)
        .bind(receipt.period_end)
        .bind(lines.worked_hours.to_string())
        .bind(lines.regular_hours.to_string())
        .bind(lines.overtime_50_hours.to_string())
        .bind(lines.overtime_100_hours.to_string())
        .bind(i64::from(lines.days_worked))
        .bind(lines.base_salary.to_string())
        .bind(lines.hourly_rate.to_string())
        .bind(lines.base_pay.to_string())
        .bind(lines.overtime_pay_50.to_string())
        .bind(lines.overtime_pay_100.to_string())
        .bind(lines.total.to_string())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    /// Looks up a receipt by id.
    pub async fn get(&self, receipt_id: i64) -> EngineResult<Option<PayrollReceipt>> {
        let sql = format!(
            "SELECT {} FROM payroll_receipts WHERE id = ?",
            RECEIPT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(receipt_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(receipt_from_row).transpose()
    }

    /// Looks up a receipt, failing with `NotFound` if absent.
    pub async fn require(&self, receipt_id: i64) -> EngineResult<PayrollReceipt> {
        self.get(receipt_id)
            .await?
            .ok_or_else(|| EngineError::receipt_not_found(receipt_id))
    }

    /// Signs a GENERATED receipt.
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadySigned` when the
    /// receipt is signed already, including when a concurrent caller signed
    /// it first. A failed attempt changes nothing.
    pub async fn sign(&self, receipt_id: i64, signer_id: i64) -> EngineResult<PayrollReceipt> {
        let result = sqlx::query(
            r#"
            UPDATE payroll_receipts
            SET state = 'SIGNED', signed_by = ?, signed_at = ?
            WHERE id = ? AND state = 'GENERATED'
            "#,
        )
        .bind(signer_id)
        .bind(Utc::now())
        .bind(receipt_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payroll_receipts WHERE id = ?)")
                    .bind(receipt_id)
                    .fetch_one(&self.pool)
                    .await?;
            return Err(if exists {
                EngineError::AlreadySigned { receipt_id }
            } else {
                EngineError::receipt_not_found(receipt_id)
            });
        }

        info!(receipt_id, signer_id, "Receipt signed");
        self.require(receipt_id).await
    }

    /// Returns an employee's receipts, most recent period first.
    pub async fn list_for_employee(&self, employee_id: i64) -> EngineResult<Vec<PayrollReceipt>> {
        let sql = format!(
            "SELECT {} FROM payroll_receipts WHERE employee_id = ? \
             ORDER BY period_start DESC, id DESC",
            RECEIPT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(receipt_from_row).collect()
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    decode_decimal(column, &raw)
}

fn receipt_from_row(row: &SqliteRow) -> EngineResult<PayrollReceipt> {
    let state: String = row.try_get("state")?;
    let state = state
        .parse::<ReceiptState>()
        .map_err(|e| decode_error("state", e))?;

    let days_worked: i64 = row.try_get("days_worked")?;
    let days_worked =
        u32::try_from(days_worked).map_err(|e| decode_error("days_worked", e.to_string()))?;

    let lines = ReceiptLines {
        worked_hours: decimal_column(row, "worked_hours")?,
        regular_hours: decimal_column(row, "regular_hours")?,
        overtime_50_hours: decimal_column(row, "overtime_50_hours")?,
        overtime_100_hours: decimal_column(row, "overtime_100_hours")?,
        days_worked,
        base_salary: decimal_column(row, "base_salary")?,
        hourly_rate: decimal_column(row, "hourly_rate")?,
        base_pay: decimal_column(row, "base_pay")?,
        overtime_pay_50: decimal_column(row, "overtime_pay_50")?,
        overtime_pay_100: decimal_column(row, "overtime_pay_100")?,
        total: decimal_column(row, "total")?,
    };

    Ok(PayrollReceipt {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        role: row.try_get("role")?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        lines,
        state,
        signed_by: row.try_get("signed_by")?,
        signed_at: row.try_get("signed_at")?,
        generated_at: row.try_get("generated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentStatus, NewEmployee};
    use crate::services::EmployeeDirectory;
    use crate::store::{open_in_memory, open_temp_file};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn new_receipt(employee_id: i64, month: u32) -> NewReceipt {
        NewReceipt {
            employee_id,
            role: "Cajero".to_string(),
            period_start: NaiveDate::from_ymd_opt(2026, month, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, month + 1, 1).unwrap(),
            lines: ReceiptLines {
                worked_hours: dec("170"),
                regular_hours: dec("160"),
                overtime_50_hours: dec("10"),
                overtime_100_hours: dec("0"),
                days_worked: 17,
                base_salary: dec("1200.00"),
                hourly_rate: dec("7.5000"),
                base_pay: dec("1200.00"),
                overtime_pay_50: dec("112.50"),
                overtime_pay_100: dec("0.00"),
                total: dec("1312.50"),
            },
        }
    }

    async fn setup() -> (ReceiptLifecycle, i64) {
        setup_with_pool(open_in_memory().await.unwrap()).await
    }

    async fn setup_with_pool(pool: SqlitePool) -> (ReceiptLifecycle, i64) {
        let employee = EmployeeDirectory::new(pool.clone())
            .create(NewEmployee {
                first_name: "Ana".to_string(),
                last_name: "García".to_string(),
                role: "Cajero".to_string(),
                status: EmploymentStatus::Active,
                schedule: String::new(),
                email: None,
                phone: None,
            })
            .await
            .unwrap();
        (ReceiptLifecycle::new(pool), employee.id)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (receipts, employee_id) = setup().await;
        let stored = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();

        assert_eq!(stored.state, ReceiptState::Generated);
        assert_eq!(stored.signed_by, None);
        assert_eq!(stored.lines, new_receipt(employee_id, 3).lines);
        // Stored decimals keep their scale.
        assert_eq!(stored.lines.total.to_string(), "1312.50");

        let fetched = receipts.get(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_get_missing_receipt() {
        let (receipts, _) = setup().await;
        assert!(receipts.get(7).await.unwrap().is_none());
        assert!(matches!(
            receipts.require(7).await,
            Err(EngineError::NotFound {
                entity: "Receipt",
                id: 7
            })
        ));
    }

    #[tokio::test]
    async fn test_sign_receipt() {
        let (receipts, employee_id) = setup().await;
        let stored = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();

        let signed = receipts.sign(stored.id, 900).await.unwrap();

        assert!(signed.is_signed());
        assert_eq!(signed.signed_by, Some(900));
        assert!(signed.signed_at.is_some());
        assert_eq!(signed.lines, stored.lines);
    }

    #[tokio::test]
    async fn test_sign_twice_is_already_signed() {
        let (receipts, employee_id) = setup().await;
        let stored = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();
        let first = receipts.sign(stored.id, 900).await.unwrap();

        match receipts.sign(stored.id, 901).await {
            Err(EngineError::AlreadySigned { receipt_id }) => assert_eq!(receipt_id, stored.id),
            other => panic!("Expected AlreadySigned, got {:?}", other),
        }

        let after = receipts.require(stored.id).await.unwrap();
        assert_eq!(after, first);
        assert_eq!(after.signed_by, Some(900));
    }

    #[tokio::test]
    async fn test_sign_unknown_receipt() {
        let (receipts, _) = setup().await;
        assert!(matches!(
            receipts.sign(404, 900).await,
            Err(EngineError::NotFound { id: 404, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signing_has_one_winner() {
        let (_dir, pool) = open_temp_file(8).await.unwrap();
        let (receipts, employee_id) = setup_with_pool(pool).await;

        for month in 1..=10 {
            let stored = receipts.insert(new_receipt(employee_id, month)).await.unwrap();

            let mut handles = Vec::new();
            for signer in 0..16 {
                let receipts = receipts.clone();
                let id = stored.id;
                handles.push(tokio::spawn(async move { receipts.sign(id, signer).await }));
            }

            let mut winners = Vec::new();
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(receipt) => winners.push(receipt),
                    Err(EngineError::AlreadySigned { .. }) => {}
                    Err(other) => panic!("Unexpected error {:?}", other),
                }
            }

            assert_eq!(winners.len(), 1, "month {}", month);
            let fetched = receipts.require(stored.id).await.unwrap();
            assert_eq!(fetched, winners[0]);
        }
    }

    #[tokio::test]
    async fn test_signed_receipt_rejects_direct_updates() {
        let (receipts, employee_id) = setup().await;
        let stored = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();
        let signed = receipts.sign(stored.id, 900).await.unwrap();

        let result = sqlx::query("UPDATE payroll_receipts SET signed_by = 1 WHERE id = ?")
            .bind(stored.id)
            .execute(&receipts.pool)
            .await;
        assert!(result.is_err());

        let result = sqlx::query("DELETE FROM payroll_receipts WHERE id = ?")
            .bind(stored.id)
            .execute(&receipts.pool)
            .await;
        assert!(result.is_err());

        assert_eq!(receipts.require(stored.id).await.unwrap(), signed);
    }

    #[tokio::test]
    async fn test_line_items_are_immutable_before_signing() {
        let (receipts, employee_id) = setup().await;
        let stored = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();

        let result = sqlx::query("UPDATE payroll_receipts SET total = '0.00' WHERE id = ?")
            .bind(stored.id)
            .execute(&receipts.pool)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_for_employee_most_recent_first() {
        let (receipts, employee_id) = setup().await;
        let march = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();
        let february = receipts.insert(new_receipt(employee_id, 2)).await.unwrap();
        let march_again = receipts.insert(new_receipt(employee_id, 3)).await.unwrap();

        let ids: Vec<i64> = receipts
            .list_for_employee(employee_id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec![march_again.id, march.id, february.id]);
        assert!(receipts.list_for_employee(employee_id + 1).await.unwrap().is_empty());
    }
}
