//! Configuration loading and management for the payroll engine.
//!
//! This module loads the rate table (role to base monthly salary) and the
//! overtime policy from YAML files so rates can vary per deployment.
//!
//! # Example
//!
//! ```no_run
//! use chango_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/chango").unwrap();
//! println!("Loaded rates for: {}", config.company().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CompanyMetadata, OvertimeConfig, OvertimePolicy, PayrollConfig, RateTable, RoleRate,
};
