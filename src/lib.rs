//! Time-tracking and payroll engine for the Chango employee backend.
//!
//! Employees clock in and out through an append-only attendance ledger.
//! At the end of a month the payroll calculator pairs those events into work
//! periods, splits the hours into regular, 50% and 100% overtime bands, and
//! stores a payroll receipt that an operator signs exactly once.
//!
//! - [`calculation`]: pure pairing, hour partitioning and money rounding
//! - [`services`]: the directory, ledger, calculator and receipt lifecycle
//! - [`store`]: SQLite pool and schema
//! - [`api`]: the axum router

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
