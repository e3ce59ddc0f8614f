//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id and answers errors
//! with a JSON [`ApiError`](super::response::ApiError) body.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{EmployeeUpdate, NewEmployee};

use super::request::{
    AttendanceQuery, ClockRequest, GenerateReceiptRequest, PaginationQuery, SignReceiptRequest,
    StatsQuery,
};
use super::response::{
    ApiErrorResponse, AttendanceLogResponse, EmployeeListResponse, HealthResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(list_employees_handler).post(create_employee_handler))
        .route(
            "/employees/:id",
            get(get_employee_handler).put(update_employee_handler),
        )
        .route("/stats/employees", get(employee_stats_handler))
        .route("/attendance/entry", post(record_entry_handler))
        .route("/attendance/exit", post(record_exit_handler))
        .route("/attendance/employee/:id", get(attendance_log_handler))
        .route("/stats/attendance", get(attendance_stats_handler))
        .route("/receipts/generate", post(generate_receipt_handler))
        .route("/receipts/:id", get(get_receipt_handler))
        .route("/receipts/:id/sign", post(sign_receipt_handler))
        .route(
            "/receipts/employee/:employee_id",
            get(list_receipts_handler),
        )
        .with_state(state)
}

/// Writes a JSON success response.
fn respond<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Logs and writes a JSON error response.
fn reject(correlation_id: Uuid, error: impl Into<ApiErrorResponse>) -> Response {
    let error = error.into();
    warn!(
        correlation_id = %correlation_id,
        status = error.status.as_u16(),
        code = %error.error.code,
        error = %error.error.message,
        "Request failed"
    );
    error.into_response()
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Response {
    let company = state.config().company();
    respond(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            company: company.name.clone(),
            config_version: company.version.clone(),
        },
    )
}

/// Handler for GET /employees?skip&limit&search.
async fn list_employees_handler(
    State(state): State<AppState>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Listing employees");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    let (skip, limit) = match query.resolve() {
        Ok(bounds) => bounds,
        Err(error) => return reject(correlation_id, ApiErrorResponse::bad_request(error)),
    };

    let search = query.search_term();
    let directory = state.directory();
    let page = async {
        let employees = directory.search(search, skip, limit).await?;
        let total = directory.count_matching(search).await?;
        Ok::<_, EngineError>(EmployeeListResponse {
            employees,
            total,
            skip,
            limit,
        })
    };

    match page.await {
        Ok(page) => respond(StatusCode::OK, page),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /employees/:id.
async fn get_employee_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, employee_id = id, "Fetching employee");

    match state.directory().get(id).await {
        Ok(Some(employee)) => respond(StatusCode::OK, employee),
        Ok(None) => reject(correlation_id, EngineError::employee_not_found(id)),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for POST /employees.
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employee creation");

    let new_employee = match payload {
        Ok(Json(new_employee)) => new_employee,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    if !state.config().is_known_role(&new_employee.role) {
        return reject(
            correlation_id,
            EngineError::UnknownRole {
                role: new_employee.role,
            },
        );
    }

    match state.directory().create(new_employee).await {
        Ok(employee) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = employee.id,
                "Employee created"
            );
            respond(StatusCode::CREATED, employee)
        }
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for PUT /employees/:id.
async fn update_employee_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, employee_id = id, "Processing employee update");

    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    if let Some(role) = &update.role {
        if !state.config().is_known_role(role) {
            return reject(correlation_id, EngineError::UnknownRole { role: role.clone() });
        }
    }

    match state.directory().update(id, update).await {
        Ok(employee) => respond(StatusCode::OK, employee),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /stats/employees.
async fn employee_stats_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Computing employee statistics");

    match state.directory().stats().await {
        Ok(stats) => respond(StatusCode::OK, stats),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for POST /attendance/entry.
async fn record_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClockRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing entry request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(correlation_id, rejection),
    };

    match state
        .ledger()
        .record_entry(request.employee_id, request.timestamp_or_now())
        .await
    {
        Ok(event) => respond(StatusCode::CREATED, event),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for POST /attendance/exit.
async fn record_exit_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClockRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing exit request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(correlation_id, rejection),
    };

    match state
        .ledger()
        .record_exit(request.employee_id, request.timestamp_or_now())
        .await
    {
        Ok(event) => respond(StatusCode::CREATED, event),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /attendance/employee/:id.
///
/// Returns the raw events in `[from, to)` together with the closed periods
/// whose entry lies in that window.
async fn attendance_log_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(employee_id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, employee_id, "Fetching attendance log");

    let (from, to) = match query.window() {
        Ok(window) => window,
        Err(error) => return reject(correlation_id, ApiErrorResponse::bad_request(error)),
    };

    let ledger = state.ledger();
    let log = async {
        let events = ledger
            .events_for_employee(employee_id, query.from, query.to)
            .await?;
        let summary = ledger.compute_worked_duration(employee_id, from, to).await?;
        Ok::<_, EngineError>(AttendanceLogResponse {
            employee_id,
            events,
            summary,
        })
    };

    match log.await {
        Ok(log) => respond(StatusCode::OK, log),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /stats/attendance.
async fn attendance_stats_handler(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    info!(correlation_id = %correlation_id, %date, "Computing attendance statistics");

    match state.ledger().daily_stats(date).await {
        Ok(stats) => respond(StatusCode::OK, stats),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for POST /receipts/generate.
async fn generate_receipt_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateReceiptRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing receipt generation");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state
        .payroll()
        .generate_receipt(request.employee_id, request.period_start, request.period_end)
        .await
    {
        Ok(receipt) => {
            info!(
                correlation_id = %correlation_id,
                receipt_id = receipt.id,
                employee_id = receipt.employee_id,
                total = %receipt.lines.total,
                duration_us = start_time.elapsed().as_micros(),
                "Receipt generation completed successfully"
            );
            respond(StatusCode::CREATED, receipt)
        }
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /receipts/:id.
async fn get_receipt_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, receipt_id = id, "Fetching receipt");

    match state.receipts().require(id).await {
        Ok(receipt) => respond(StatusCode::OK, receipt),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for POST /receipts/:id/sign.
async fn sign_receipt_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SignReceiptRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, receipt_id = id, "Processing receipt signature");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject(correlation_id, rejection),
    };

    match state.receipts().sign(id, request.signer_id).await {
        Ok(receipt) => respond(StatusCode::OK, receipt),
        Err(err) => reject(correlation_id, err),
    }
}

/// Handler for GET /receipts/employee/:employee_id.
async fn list_receipts_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(employee_id) = match id {
        Ok(id) => id,
        Err(rejection) => return reject(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, employee_id, "Listing receipts");

    if let Err(err) = state.directory().require(employee_id).await {
        return reject(correlation_id, err);
    }
    match state.receipts().list_for_employee(employee_id).await {
        Ok(receipts) => respond(StatusCode::OK, receipts),
        Err(err) => reject(correlation_id, err),
    }
}
