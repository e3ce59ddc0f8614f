//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for attendance, employees and
//! payroll receipts.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceQuery, ClockRequest, GenerateReceiptRequest, PaginationQuery, SignReceiptRequest,
    StatsQuery,
};
pub use response::{
    ApiError, ApiErrorResponse, AttendanceLogResponse, EmployeeListResponse, HealthResponse,
};
pub use state::AppState;
