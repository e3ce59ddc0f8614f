//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions behind payroll generation:
//! pairing attendance events into work periods, splitting worked hours into
//! regular and overtime bands, and computing receipt line items with
//! cent-precision rounding.

mod overtime_bands;
mod receipt_lines;
mod work_periods;

pub use overtime_bands::{HourBands, partition_hours};
pub use receipt_lines::{
    MONEY_SCALE, RATE_SCALE, build_receipt, calculate_receipt_lines, round_to_cent,
};
pub use work_periods::pair_events;
