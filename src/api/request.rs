//! Request types for the payroll API.
//!
//! JSON bodies and query strings accepted by the endpoints. Employee bodies
//! reuse [`crate::models::NewEmployee`] and [`crate::models::EmployeeUpdate`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::response::ApiError;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Body of `POST /attendance/entry` and `POST /attendance/exit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockRequest {
    /// The employee clocking in or out.
    pub employee_id: i64,
    /// When it happened; the server's current time if absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ClockRequest {
    /// Returns the event time, defaulting to now.
    pub fn timestamp_or_now(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}

/// Body of `POST /receipts/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReceiptRequest {
    /// The employee to pay.
    pub employee_id: i64,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Day after the period (exclusive).
    pub period_end: NaiveDate,
}

/// Body of `POST /receipts/:id/sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignReceiptRequest {
    /// The operator signing the receipt.
    pub signer_id: i64,
}

/// `?skip&limit&search` on list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    /// Rows to skip.
    #[serde(default)]
    pub skip: Option<i64>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Substring to match against first name, last name or role.
    #[serde(default)]
    pub search: Option<String>,
}

impl PaginationQuery {
    /// Returns `(skip, limit)` with defaults applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use chango_payroll::api::PaginationQuery;
    ///
    /// let query = PaginationQuery::default();
    /// assert_eq!(query.resolve().unwrap(), (0, 20));
    ///
    /// let query = PaginationQuery { skip: Some(0), limit: Some(500), search: None };
    /// assert!(query.resolve().is_err());
    /// ```
    pub fn resolve(&self) -> Result<(i64, i64), ApiError> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if skip < 0 {
            return Err(ApiError::validation_error("skip must not be negative"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::validation_error(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok((skip, limit))
    }

    /// The trimmed search term, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// `?from&to` on `GET /attendance/employee/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    /// Lower bound (inclusive).
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Upper bound (exclusive).
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl AttendanceQuery {
    /// Returns the window to summarise, unbounded on missing sides.
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        let from = self.from.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let to = self.to.unwrap_or(DateTime::<Utc>::MAX_UTC);
        if from >= to {
            return Err(ApiError::validation_error("from must be before to"));
        }
        Ok((from, to))
    }
}

/// `?date` on `GET /stats/attendance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    /// The UTC date; today if absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_clock_request_without_timestamp() {
        let request: ClockRequest = serde_json::from_str(r#"{"employee_id": 3}"#).unwrap();
        assert_eq!(request.employee_id, 3);
        assert!(request.timestamp.is_none());

        let before = Utc::now();
        assert!(request.timestamp_or_now() >= before);
    }

    #[test]
    fn test_deserialize_clock_request_with_timestamp() {
        let json = r#"{"employee_id": 3, "timestamp": "2026-03-02T09:00:00.250Z"}"#;
        let request: ClockRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.timestamp_or_now().timestamp_millis() % 1000,
            250
        );
    }

    #[test]
    fn test_deserialize_generate_request() {
        let json = r#"{
            "employee_id": 1,
            "period_start": "2026-03-01",
            "period_end": "2026-04-01"
        }"#;
        let request: GenerateReceiptRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.period_end,
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_pagination_bounds() {
        let page = |skip, limit| {
            PaginationQuery {
                skip,
                limit,
                search: None,
            }
            .resolve()
        };

        assert_eq!(page(Some(40), Some(100)).unwrap(), (40, 100));
        assert!(page(Some(-1), None).is_err());
        assert!(page(None, Some(0)).is_err());
        assert!(page(None, Some(101)).is_err());
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let query = |search: Option<&str>| PaginationQuery {
            search: search.map(str::to_string),
            ..Default::default()
        };

        assert_eq!(query(Some("  caj ")).search_term(), Some("caj"));
        assert_eq!(query(Some("   ")).search_term(), None);
        assert_eq!(query(None).search_term(), None);
    }

    #[test]
    fn test_attendance_window() {
        let query = AttendanceQuery::default();
        let (from, to) = query.window().unwrap();
        assert!(from < to);

        let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
        let reversed = AttendanceQuery {
            from: Some(at("2026-03-02T00:00:00Z")),
            to: Some(at("2026-03-01T00:00:00Z")),
        };
        assert!(reversed.window().is_err());
    }
}
