//! Response types for the payroll API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP status codes, and the response bodies that are
//! not plain models.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{AttendanceEvent, Employee, WorkedDuration};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::InvalidSequence { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INVALID_SEQUENCE",
                    message,
                    "Entries and exits must alternate and move forward in time",
                ),
            ),
            EngineError::IncompleteAttendance { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INCOMPLETE_ATTENDANCE",
                    message,
                    "Record the missing exit before generating the receipt",
                ),
            ),
            EngineError::AlreadySigned { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("ALREADY_SIGNED", message),
            ),
            EngineError::UnknownEmployee { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("UNKNOWN_EMPLOYEE", message),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::UnknownRole { role } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "UNKNOWN_ROLE",
                    message,
                    format!("The role '{}' has no base salary in the rate table", role),
                ),
            ),
            EngineError::InactiveEmployee { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INACTIVE_EMPLOYEE", message),
            ),
            EngineError::InvalidPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            EngineError::InvalidEmployee { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_EMPLOYEE",
                    message,
                    "The employee data contains invalid information",
                ),
            ),
            EngineError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
        };
        Self { status, error }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                if body_text.contains("missing field") {
                    ApiError::validation_error(body_text)
                } else {
                    ApiError::malformed_json(body_text)
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
            }
            _ => ApiError::malformed_json("Failed to parse request body"),
        };
        Self::bad_request(error)
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(ApiError::validation_error(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(ApiError::validation_error(rejection.body_text()))
    }
}

/// Body of `GET /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    /// The page.
    pub employees: Vec<Employee>,
    /// Number of employees matching the search, or overall.
    pub total: i64,
    /// Rows skipped.
    pub skip: i64,
    /// Page size.
    pub limit: i64,
}

/// Body of `GET /attendance/employee/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLogResponse {
    /// The employee.
    pub employee_id: i64,
    /// Raw events in the window, oldest first.
    pub events: Vec<AttendanceEvent>,
    /// Closed periods and hours in the window.
    pub summary: WorkedDuration,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Crate version.
    pub version: String,
    /// Company the configuration belongs to.
    pub company: String,
    /// Version of the loaded configuration.
    pub config_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (
                EngineError::InvalidSequence {
                    employee_id: 1,
                    timestamp: Utc::now(),
                    message: "no open entry".to_string(),
                },
                StatusCode::CONFLICT,
                "INVALID_SEQUENCE",
            ),
            (
                EngineError::IncompleteAttendance {
                    employee_id: 1,
                    period_start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                    period_end: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                },
                StatusCode::CONFLICT,
                "INCOMPLETE_ATTENDANCE",
            ),
            (
                EngineError::AlreadySigned { receipt_id: 4 },
                StatusCode::CONFLICT,
                "ALREADY_SIGNED",
            ),
            (
                EngineError::UnknownEmployee { employee_id: 9 },
                StatusCode::NOT_FOUND,
                "UNKNOWN_EMPLOYEE",
            ),
            (
                EngineError::receipt_not_found(4),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                EngineError::UnknownRole {
                    role: "Astronauta".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_ROLE",
            ),
            (
                EngineError::InactiveEmployee {
                    employee_id: 1,
                    status: "inactive".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "INACTIVE_EMPLOYEE",
            ),
            (
                EngineError::Storage(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
            ),
        ];

        for (engine_error, status, code) in cases {
            let response: ApiErrorResponse = engine_error.into();
            assert_eq!(response.status, status, "status for {}", code);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_unknown_role_message() {
        let response: ApiErrorResponse = EngineError::UnknownRole {
            role: "Astronauta".to_string(),
        }
        .into();
        assert_eq!(response.error.message, "Unknown role: Astronauta");
        assert!(response.error.details.unwrap().contains("Astronauta"));
    }
}
