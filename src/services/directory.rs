//! Employee directory.
//!
//! SQL-backed employee records. The ledger and the payroll calculator use it
//! to resolve an employee's role and status; HR uses it to hire staff and
//! change their role or status. Records are never deleted.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeStats, EmployeeUpdate, EmploymentStatus, NewEmployee, RoleCount,
};
use crate::store::decode_error;

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, role, status, schedule, email, \
                                phone, created_at, updated_at";

/// Matches every row when `?1` is NULL.
const SEARCH_FILTER: &str = "(?1 IS NULL \
                             OR first_name LIKE ?1 ESCAPE '\\' \
                             OR last_name LIKE ?1 ESCAPE '\\' \
                             OR role LIKE ?1 ESCAPE '\\')";

/// Access to employee records.
#[derive(Debug, Clone)]
pub struct EmployeeDirectory {
    pool: SqlitePool,
}

impl EmployeeDirectory {
    /// Creates a directory over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hires an employee.
    pub async fn create(&self, new_employee: NewEmployee) -> EngineResult<Employee> {
        new_employee.validate()?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees
                (first_name, last_name, role, status, schedule, email, phone,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&new_employee.first_name)
        .bind(&new_employee.last_name)
        .bind(&new_employee.role)
        .bind(new_employee.status.as_str())
        .bind(&new_employee.schedule)
        .bind(&new_employee.email)
        .bind(&new_employee.phone)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(employee_id = id, role = %new_employee.role, "Employee created");
        self.require(id).await
    }

    /// Looks up an employee by id.
    pub async fn get(&self, id: i64) -> EngineResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Looks up an employee, failing with `UnknownEmployee` if absent.
    pub async fn require(&self, id: i64) -> EngineResult<Employee> {
        self.get(id)
            .await?
            .ok_or(EngineError::UnknownEmployee { employee_id: id })
    }

    /// Returns a page of employees ordered by id.
    pub async fn list(&self, skip: i64, limit: i64) -> EngineResult<Vec<Employee>> {
        self.search(None, skip, limit).await
    }

    /// Returns a page of the employees whose first name, last name or role
    /// contains `search` (case-insensitive for ASCII), ordered by id.
    pub async fn search(
        &self,
        search: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> EngineResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE {} ORDER BY id LIMIT ?2 OFFSET ?3",
            EMPLOYEE_COLUMNS, SEARCH_FILTER
        );
        let rows = sqlx::query(&sql)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(employee_from_row).collect()
    }

    /// Counts all employees.
    pub async fn count(&self) -> EngineResult<i64> {
        self.count_matching(None).await
    }

    /// Counts the employees matching `search`, or all of them.
    pub async fn count_matching(&self, search: Option<&str>) -> EngineResult<i64> {
        let count = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM employees WHERE {}",
            SEARCH_FILTER
        ))
        .bind(search.map(like_pattern))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Applies a partial update, failing with `NotFound` if the id is unknown.
    ///
    /// Absent fields keep their stored value. The merge happens inside a
    /// single `UPDATE`, so concurrent partial updates of different fields
    /// all land.
    pub async fn update(&self, id: i64, update: EmployeeUpdate) -> EngineResult<Employee> {
        update.validate()?;

        let sql = format!(
            r#"
            UPDATE employees
            SET first_name = COALESCE(?1, first_name),
                last_name = COALESCE(?2, last_name),
                role = COALESCE(?3, role),
                status = COALESCE(?4, status),
                schedule = COALESCE(?5, schedule),
                email = COALESCE(?6, email),
                phone = COALESCE(?7, phone),
                updated_at = ?8
            WHERE id = ?9
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.role)
            .bind(update.status.map(|status| status.as_str()))
            .bind(&update.schedule)
            .bind(&update.email)
            .bind(&update.phone)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| EngineError::employee_not_found(id))?;

        let employee = employee_from_row(&row)?;
        if let Some(status) = update.status {
            info!(employee_id = id, status = %status, "Employee status set");
        }
        Ok(employee)
    }

    /// Headcount by status and by role.
    pub async fn stats(&self) -> EngineResult<EmployeeStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(status = 'active'), 0) AS active,
                COALESCE(SUM(status = 'inactive'), 0) AS inactive,
                COALESCE(SUM(status = 'on_leave'), 0) AS on_leave
            FROM employees
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let roles = sqlx::query(
            "SELECT role, COUNT(*) AS count FROM employees \
             GROUP BY role ORDER BY count DESC, role",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|r| -> Result<RoleCount, sqlx::Error> {
            Ok(RoleCount {
                role: r.try_get("role")?,
                count: r.try_get("count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(EmployeeStats {
            total: row.try_get("total")?,
            active: row.try_get("active")?,
            inactive: row.try_get("inactive")?,
            on_leave: row.try_get("on_leave")?,
            roles,
        })
    }
}

/// Wraps a search term in `%` after escaping LIKE wildcards.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn employee_from_row(row: &SqliteRow) -> EngineResult<Employee> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<EmploymentStatus>()
        .map_err(|e| decode_error("status", e.to_string()))?;

    Ok(Employee {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        role: row.try_get("role")?,
        status,
        schedule: row.try_get("schedule")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
