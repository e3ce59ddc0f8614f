//! Employee model and related types.
//!
//! This module defines the Employee struct and EmploymentStatus enum
//! for the employee directory.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents an employee's employment status.
///
/// Employees are never deleted; leaving the company is a transition to
/// [`EmploymentStatus::Inactive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Currently working and allowed to clock in.
    Active,
    /// No longer employed.
    Inactive,
    /// Temporarily away (holidays, leave).
    OnLeave,
}

impl EmploymentStatus {
    /// Returns the storage and wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::Inactive => "inactive",
            EmploymentStatus::OnLeave => "on_leave",
        }
    }

    /// Returns true if an employee with this status may record an entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use chango_payroll::models::EmploymentStatus;
    ///
    /// assert!(EmploymentStatus::Active.can_clock_in());
    /// assert!(!EmploymentStatus::OnLeave.can_clock_in());
    /// ```
    pub fn can_clock_in(&self) -> bool {
        *self == EmploymentStatus::Active
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmploymentStatus::Active),
            "inactive" => Ok(EmploymentStatus::Inactive),
            "on_leave" => Ok(EmploymentStatus::OnLeave),
            other => Err(EngineError::InvalidEmployee {
                field: "status".to_string(),
                message: format!("unknown status '{}'", other),
            }),
        }
    }
}

/// Represents an employee in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The role, used as the key into the rate table (e.g., "Cajero").
    pub role: String,
    /// Current employment status.
    pub status: EmploymentStatus,
    /// Free-form working schedule (e.g., "Lun-Vie 09:00-17:00").
    pub schedule: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Returns the employee's display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The fields needed to hire an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The role.
    pub role: String,
    /// Initial status; defaults to active.
    #[serde(default = "default_status")]
    pub status: EmploymentStatus,
    /// Working schedule.
    #[serde(default)]
    pub schedule: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

fn default_status() -> EmploymentStatus {
    EmploymentStatus::Active
}

impl NewEmployee {
    /// Checks required fields and the email shape.
    pub fn validate(&self) -> EngineResult<()> {
        require_non_blank("first_name", &self.first_name)?;
        require_non_blank("last_name", &self.last_name)?;
        require_non_blank("role", &self.role)?;
        validate_email(self.email.as_deref())
    }
}

/// A partial update of an employee record. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    /// New given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<EmploymentStatus>,
    /// New schedule.
    #[serde(default)]
    pub schedule: Option<String>,
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
    /// New phone.
    #[serde(default)]
    pub phone: Option<String>,
}

impl EmployeeUpdate {
    /// Checks the fields that are present.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(first_name) = &self.first_name {
            require_non_blank("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_blank("last_name", last_name)?;
        }
        if let Some(role) = &self.role {
            require_non_blank("role", role)?;
        }
        validate_email(self.email.as_deref())
    }
}

fn require_non_blank(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidEmployee {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_email(email: Option<&str>) -> EngineResult<()> {
    match email {
        Some(email) if !email.contains('@') => Err(EngineError::InvalidEmployee {
            field: "email".to_string(),
            message: format!("'{}' is not an email address", email),
        }),
        _ => Ok(()),
    }
}

/// Headcount per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    /// The role.
    pub role: String,
    /// Number of employees with that role.
    pub count: i64,
}

/// Directory-wide headcount statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeStats {
    /// All employees ever hired.
    pub total: i64,
    /// Employees with status active.
    pub active: i64,
    /// Employees with status inactive.
    pub inactive: i64,
    /// Employees with status on_leave.
    pub on_leave: i64,
    /// Headcount per role, largest first.
    pub roles: Vec<RoleCount>,
}
