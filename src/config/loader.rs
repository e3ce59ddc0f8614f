//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CompanyMetadata, OvertimeConfig, OvertimePolicy, PayrollConfig, RateTable};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/chango/
/// ├── company.yaml   # Company metadata
/// ├── rates.yaml     # Role -> base monthly salary
/// └── overtime.yaml  # Standard hours, band thresholds and multipliers
/// ```
///
/// # Example
///
/// ```no_run
/// use chango_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/chango")?;
/// let salary = loader.get_base_salary("Cajero")?;
/// println!("Cajero earns {}", salary);
/// # Ok::<(), chango_payroll::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails with `ConfigNotFound` when a file is missing and with
    /// `ConfigParseError` when a file is not valid YAML for its type or the
    /// overtime thresholds are inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<CompanyMetadata>(&path.join("company.yaml"))?;
        let rates = Self::load_yaml::<RateTable>(&path.join("rates.yaml"))?;

        let overtime_path = path.join("overtime.yaml");
        let overtime = Self::load_yaml::<OvertimeConfig>(&overtime_path)?;
        Self::validate_overtime(&overtime, &overtime_path.display().to_string())?;

        Ok(Self {
            config: PayrollConfig::new(metadata, rates, overtime),
        })
    }

    /// Wraps an already-built configuration, for fixtures and embedding.
    pub fn from_parts(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_overtime(overtime: &OvertimeConfig, path: &str) -> EngineResult<()> {
        let policies = std::iter::once(("default", &overtime.default))
            .chain(overtime.overrides.iter().map(|(k, v)| (k.as_str(), v)));

        for (name, policy) in policies {
            if policy.standard_monthly_hours <= Decimal::ZERO {
                return Err(EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: format!("{}: standard_monthly_hours must be positive", name),
                });
            }
            if policy.overtime_100_threshold < policy.standard_monthly_hours {
                return Err(EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: format!(
                        "{}: overtime_100_threshold must not be below standard_monthly_hours",
                        name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the company metadata.
    pub fn company(&self) -> &CompanyMetadata {
        self.config.company()
    }

    /// Gets the base monthly salary of a role, or `UnknownRole`.
    pub fn get_base_salary(&self, role: &str) -> EngineResult<Decimal> {
        self.config
            .rates()
            .base_salary(role)
            .ok_or_else(|| EngineError::UnknownRole {
                role: role.to_string(),
            })
    }

    /// Gets the overtime policy for a role, falling back to the default.
    pub fn get_overtime_policy(&self, role: &str) -> &OvertimePolicy {
        self.config.overtime_policy(role)
    }

    /// Returns true when the role is present in the rate table.
    pub fn is_known_role(&self, role: &str) -> bool {
        self.config.rates().base_salary(role).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/chango"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.company().name, "Chango");
        assert_eq!(loader.company().currency, "ARS");
    }

    #[test]
    fn test_get_base_salary_for_cajero() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.get_base_salary("Cajero").unwrap(), dec("1200.00"));
        assert_eq!(loader.get_base_salary("Gerente").unwrap(), dec("2500.00"));
        assert_eq!(
            loader.get_base_salary("Soporte Técnico").unwrap(),
            dec("1800.00")
        );
    }

    #[test]
    fn test_get_base_salary_unknown_role_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_base_salary("Astronauta") {
            Err(EngineError::UnknownRole { role }) => assert_eq!(role, "Astronauta"),
            other => panic!("Expected UnknownRole error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_overtime_policy() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let policy = loader.get_overtime_policy("Cajero");

        assert_eq!(policy.standard_monthly_hours, dec("160"));
        assert_eq!(policy.overtime_100_threshold, dec("190"));
        assert_eq!(policy.multiplier_50, dec("1.5"));
        assert_eq!(policy.multiplier_100, dec("2.0"));
    }

    #[test]
    fn test_role_override_overtime_policy() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let policy = loader.get_overtime_policy("Seguridad");

        assert_eq!(policy.standard_monthly_hours, dec("192"));
        assert_eq!(policy.overtime_100_threshold, dec("216"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.contains("company.yaml")),
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let overtime = OvertimeConfig {
            default: OvertimePolicy {
                standard_monthly_hours: dec("160"),
                overtime_100_threshold: dec("150"),
                multiplier_50: dec("1.5"),
                multiplier_100: dec("2.0"),
            },
            overrides: Default::default(),
        };

        let result = ConfigLoader::validate_overtime(&overtime, "overtime.yaml");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_multipliers_default_when_omitted() {
        let yaml = "standard_monthly_hours: 160\novertime_100_threshold: 200\n";
        let policy: OvertimePolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.multiplier_50, dec("1.5"));
        assert_eq!(policy.multiplier_100, dec("2"));
    }
}
