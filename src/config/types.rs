//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Metadata about the deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyMetadata {
    /// The company name printed on receipts.
    pub name: String,
    /// ISO 4217 code of the currency all amounts are expressed in.
    pub currency: String,
    /// The version or effective date of this configuration.
    pub version: String,
}

/// Salary information for one role.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRate {
    /// The base monthly salary for the role.
    pub base_salary: Decimal,
}

/// Rate table file structure (`rates.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// Map of role name to its rate.
    pub roles: HashMap<String, RoleRate>,
}

impl RateTable {
    /// Returns the base monthly salary for a role, if the role is known.
    pub fn base_salary(&self, role: &str) -> Option<Decimal> {
        self.roles.get(role).map(|r| r.base_salary)
    }
}

/// Hour thresholds and premium multipliers used to split worked hours.
///
/// Hours up to `standard_monthly_hours` are regular, hours above it up to
/// `overtime_100_threshold` are paid at `multiplier_50`, anything beyond is
/// paid at `multiplier_100`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OvertimePolicy {
    /// The monthly norm of non-overtime hours.
    pub standard_monthly_hours: Decimal,
    /// Monthly hour count at which the 100% band starts.
    pub overtime_100_threshold: Decimal,
    /// Multiplier for the 50% band.
    #[serde(default = "default_multiplier_50")]
    pub multiplier_50: Decimal,
    /// Multiplier for the 100% band.
    #[serde(default = "default_multiplier_100")]
    pub multiplier_100: Decimal,
}

fn default_multiplier_50() -> Decimal {
    Decimal::new(15, 1)
}

fn default_multiplier_100() -> Decimal {
    Decimal::new(2, 0)
}

/// Overtime configuration file structure (`overtime.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeConfig {
    /// Policy applied when a role has no override.
    pub default: OvertimePolicy,
    /// Per-role (or per-contract) policies.
    #[serde(default)]
    pub overrides: HashMap<String, OvertimePolicy>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    metadata: CompanyMetadata,
    rates: RateTable,
    overtime: OvertimeConfig,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(metadata: CompanyMetadata, rates: RateTable, overtime: OvertimeConfig) -> Self {
        Self {
            metadata,
            rates,
            overtime,
        }
    }

    /// Returns the company metadata.
    pub fn company(&self) -> &CompanyMetadata {
        &self.metadata
    }

    /// Returns the role rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Returns the overtime configuration.
    pub fn overtime(&self) -> &OvertimeConfig {
        &self.overtime
    }

    /// Returns the overtime policy that applies to a role.
    pub fn overtime_policy(&self, role: &str) -> &OvertimePolicy {
        self.overtime
            .overrides
            .get(role)
            .unwrap_or(&self.overtime.default)
    }
}
