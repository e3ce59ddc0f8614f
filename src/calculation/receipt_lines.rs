//! Payroll receipt line computation.
//!
//! Turns a [`WorkedDuration`] into the monetary line items of a receipt:
//! base pay (prorated for partial months), pay for each overtime band and the
//! gross total.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{ConfigLoader, OvertimePolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{NewReceipt, PayPeriod, ReceiptLines, WorkedDuration};

use super::overtime_bands::partition_hours;

/// Decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places shown for the hourly rate.
pub const RATE_SCALE: u32 = 4;

/// Rounds an amount half-up to the cent and pads it to two decimals.
///
/// # Examples
///
/// ```
/// use chango_payroll::calculation::round_to_cent;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cent(Decimal::from_str("107.025").unwrap()).to_string(), "107.03");
/// assert_eq!(round_to_cent(Decimal::from_str("1312.5").unwrap()).to_string(), "1312.50");
/// ```
pub fn round_to_cent(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Computes the line items for a closed pay period.
///
/// - `hourly_rate = base_salary / standard_monthly_hours`
/// - `base_pay` is the full salary for a whole month, otherwise
///   `base_salary * min(1, days_worked / days_in_month)`
/// - overtime bands are paid at `hours * hourly_rate * multiplier`
/// - `total` is rounded once from the unrounded components
///
/// Open periods are not checked here; see [`build_receipt`].
pub fn calculate_receipt_lines(
    worked: &WorkedDuration,
    period: &PayPeriod,
    base_salary: Decimal,
    policy: &OvertimePolicy,
) -> ReceiptLines {
    let bands = partition_hours(worked.total_hours, policy, period.month_fraction());
    let hourly_rate = base_salary / policy.standard_monthly_hours;
    let days_worked = worked.days_worked();

    let base_pay = if period.is_full_month() {
        base_salary
    } else {
        let worked_fraction = (Decimal::from(days_worked)
            / Decimal::from(period.days_in_month()))
        .min(Decimal::ONE);
        base_salary * worked_fraction
    };

    let overtime_pay_50 = bands.overtime_50 * hourly_rate * policy.multiplier_50;
    let overtime_pay_100 = bands.overtime_100 * hourly_rate * policy.multiplier_100;
    let total = base_pay + overtime_pay_50 + overtime_pay_100;

    ReceiptLines {
        worked_hours: worked.total_hours,
        regular_hours: bands.regular.normalize(),
        overtime_50_hours: bands.overtime_50.normalize(),
        overtime_100_hours: bands.overtime_100.normalize(),
        days_worked,
        base_salary: round_to_cent(base_salary),
        hourly_rate: hourly_rate
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        base_pay: round_to_cent(base_pay),
        overtime_pay_50: round_to_cent(overtime_pay_50),
        overtime_pay_100: round_to_cent(overtime_pay_100),
        total: round_to_cent(total),
    }
}

/// Builds a receipt for a role from the attendance in its period.
///
/// Fails with `IncompleteAttendance` when the window still has an open
/// entry, and with `UnknownRole` when the role has no base salary. Calling it
/// twice with the same inputs yields identical line items.
pub fn build_receipt(
    employee_id: i64,
    role: &str,
    period: &PayPeriod,
    worked: &WorkedDuration,
    config: &ConfigLoader,
) -> EngineResult<NewReceipt> {
    if worked.has_open_period {
        return Err(EngineError::IncompleteAttendance {
            employee_id,
            period_start: period.start_date,
            period_end: period.end_date,
        });
    }

    let base_salary = config.get_base_salary(role)?;
    let policy = config.get_overtime_policy(role);
    let lines = calculate_receipt_lines(worked, period, base_salary, policy);

    Ok(NewReceipt {
        employee_id,
        role: role.to_string(),
        period_start: period.start_date,
        period_end: period.end_date,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompanyMetadata, OvertimeConfig, PayrollConfig, RateTable, RoleRate};
    use crate::models::WorkPeriod;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse::<DateTime<Utc>>().unwrap()
    }

    fn test_config() -> ConfigLoader {
        let mut roles = HashMap::new();
        roles.insert(
            "Cajero".to_string(),
            RoleRate {
                base_salary: dec("1200.00"),
            },
        );
        roles.insert(
            "Seguridad".to_string(),
            RoleRate {
                base_salary: dec("1250.00"),
            },
        );

        let mut overrides = HashMap::new();
        overrides.insert(
            "Seguridad".to_string(),
            OvertimePolicy {
                standard_monthly_hours: dec("192"),
                overtime_100_threshold: dec("216"),
                multiplier_50: dec("1.5"),
                multiplier_100: dec("2.0"),
            },
        );

        ConfigLoader::from_parts(PayrollConfig::new(
            CompanyMetadata {
                name: "Test".to_string(),
                currency: "ARS".to_string(),
                version: "test".to_string(),
            },
            RateTable { roles },
            OvertimeConfig {
                default: OvertimePolicy {
                    standard_monthly_hours: dec("160"),
                    overtime_100_threshold: dec("190"),
                    multiplier_50: dec("1.5"),
                    multiplier_100: dec("2.0"),
                },
                overrides,
            },
        ))
    }

    fn march() -> PayPeriod {
        PayPeriod::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        )
        .unwrap()
    }

    /// `days` shifts of `hours` each, one per day starting on `first_day`.
    fn shifts(first_day: &str, days: i64, hours: i64) -> WorkedDuration {
        let first = at(first_day);
        let periods = (0..days)
            .map(|d| {
                let entry = first + Duration::days(d);
                WorkPeriod {
                    employee_id: 1,
                    entry,
                    exit: entry + Duration::hours(hours),
                }
            })
            .collect();
        WorkedDuration::from_periods(1, periods, None)
    }

    #[test]
    fn test_round_to_cent_is_half_up() {
        assert_eq!(round_to_cent(dec("0.005")), dec("0.01"));
        assert_eq!(round_to_cent(dec("0.004999")), dec("0.00"));
        assert_eq!(round_to_cent(dec("2.675")), dec("2.68"));
        assert_eq!(round_to_cent(dec("7")).to_string(), "7.00");
    }

    #[test]
    fn test_cajero_170_hours_full_month() {
        // 17 days x 10 hours = 170 hours, 10 hours in the 50% band.
        let worked = shifts("2026-03-02T08:00:00Z", 17, 10);
        let receipt = build_receipt(1, "Cajero", &march(), &worked, &test_config()).unwrap();
        let lines = receipt.lines;

        assert_eq!(lines.worked_hours, dec("170"));
        assert_eq!(lines.regular_hours, dec("160"));
        assert_eq!(lines.overtime_50_hours, dec("10"));
        assert_eq!(lines.overtime_100_hours, Decimal::ZERO);
        assert_eq!(lines.hourly_rate, dec("7.50"));
        assert_eq!(lines.base_pay, dec("1200.00"));
        assert_eq!(lines.overtime_pay_50, dec("112.50"));
        assert_eq!(lines.overtime_pay_100, dec("0.00"));
        assert_eq!(lines.total.to_string(), "1312.50");
    }

    #[test]
    fn test_both_overtime_bands() {
        // 20 days x 10 hours = 200 hours: 160 regular, 30 at 50%, 10 at 100%.
        let worked = shifts("2026-03-02T08:00:00Z", 20, 10);
        let lines = build_receipt(1, "Cajero", &march(), &worked, &test_config())
            .unwrap()
            .lines;

        assert_eq!(lines.overtime_50_hours, dec("30"));
        assert_eq!(lines.overtime_100_hours, dec("10"));
        // 30 * 7.5 * 1.5 = 337.50 ; 10 * 7.5 * 2 = 150.00
        assert_eq!(lines.overtime_pay_50, dec("337.50"));
        assert_eq!(lines.overtime_pay_100, dec("150.00"));
        assert_eq!(lines.total, dec("1687.50"));
    }

    #[test]
    fn test_full_month_pays_full_base_regardless_of_hours() {
        let worked = shifts("2026-03-02T08:00:00Z", 5, 8);
        let lines = build_receipt(1, "Cajero", &march(), &worked, &test_config())
            .unwrap()
            .lines;
        assert_eq!(lines.base_pay, dec("1200.00"));
        assert_eq!(lines.total, dec("1200.00"));
    }

    #[test]
    fn test_partial_month_prorates_base_by_days_worked() {
        // April has 30 days; 10 worked days -> 1/3 of base.
        let period = PayPeriod::new(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 16).unwrap(),
        )
        .unwrap();
        let worked = shifts("2026-04-01T09:00:00Z", 10, 8);
        let lines = build_receipt(1, "Cajero", &period, &worked, &test_config())
            .unwrap()
            .lines;

        assert_eq!(lines.days_worked, 10);
        assert_eq!(lines.base_pay, dec("400.00"));
        // 80 hours against a half-month norm of 80: no overtime.
        assert_eq!(lines.overtime_50_hours, Decimal::ZERO);
        assert_eq!(lines.total, dec("400.00"));
    }

    #[test]
    fn test_partial_month_overtime_uses_scaled_threshold() {
        let period = PayPeriod::new(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 16).unwrap(),
        )
        .unwrap();
        // 9 days x 10 hours = 90 hours; half-month norm 80 -> 10 hours at 50%.
        let worked = shifts("2026-04-01T08:00:00Z", 9, 10);
        let lines = build_receipt(1, "Cajero", &period, &worked, &test_config())
            .unwrap()
            .lines;

        assert_eq!(lines.overtime_50_hours, dec("10"));
        assert_eq!(lines.overtime_pay_50, dec("112.50"));
        // base 1200 * 9/30 = 360.00
        assert_eq!(lines.base_pay, dec("360.00"));
        assert_eq!(lines.total, dec("472.50"));
    }

    #[test]
    fn test_role_override_policy_applies() {
        // Seguridad: norm 192, hourly 1250/192 = 6.510416...
        let worked = shifts("2026-03-01T07:00:00Z", 17, 12); // 204 hours
        let lines = build_receipt(1, "Seguridad", &march(), &worked, &test_config())
            .unwrap()
            .lines;

        assert_eq!(lines.regular_hours, dec("192"));
        assert_eq!(lines.overtime_50_hours, dec("12"));
        assert_eq!(lines.hourly_rate, dec("6.5104"));
        // 12 * (1250/192) * 1.5 = 117.1875 -> total 1367.1875 -> 1367.19
        assert_eq!(lines.overtime_pay_50, dec("117.19"));
        assert_eq!(lines.total, dec("1367.19"));
    }

    #[test]
    fn test_total_rounded_once_from_unrounded_components() {
        // 80 minutes of 50% overtime: 4/3 h * 7.5 * 1.5 = 14.999... -> 15.00.
        let mut worked = shifts("2026-03-02T08:00:00Z", 16, 10);
        let entry = at("2026-03-25T08:00:00Z");
        worked.periods.push(WorkPeriod {
            employee_id: 1,
            entry,
            exit: entry + Duration::minutes(80),
        });
        let worked = WorkedDuration::from_periods(1, worked.periods, None);
        let lines = build_receipt(1, "Cajero", &march(), &worked, &test_config())
            .unwrap()
            .lines;

        assert_eq!(lines.overtime_pay_50, dec("15.00"));
        assert_eq!(lines.total, dec("1215.00"));
    }

    #[test]
    fn test_open_period_is_incomplete_attendance() {
        let worked = WorkedDuration::from_periods(1, vec![], Some(at("2026-03-10T09:00:00Z")));
        let result = build_receipt(1, "Cajero", &march(), &worked, &test_config());
        assert!(matches!(
            result,
            Err(EngineError::IncompleteAttendance { employee_id: 1, .. })
        ));
    }

    #[test]
    fn test_open_period_reported_before_unknown_role() {
        let worked = WorkedDuration::from_periods(1, vec![], Some(at("2026-03-10T09:00:00Z")));
        let result = build_receipt(1, "Astronauta", &march(), &worked, &test_config());
        assert!(matches!(result, Err(EngineError::IncompleteAttendance { .. })));
    }

    #[test]
    fn test_unknown_role() {
        let worked = shifts("2026-03-02T08:00:00Z", 1, 8);
        let result = build_receipt(1, "Astronauta", &march(), &worked, &test_config());
        match result {
            Err(EngineError::UnknownRole { role }) => assert_eq!(role, "Astronauta"),
            other => panic!("Expected UnknownRole, got {:?}", other),
        }
    }

    #[test]
    fn test_computation_is_deterministic() {
        let worked = shifts("2026-03-02T08:15:00Z", 21, 9);
        let config = test_config();
        let first = build_receipt(1, "Cajero", &march(), &worked, &config).unwrap();
        let second = build_receipt(1, "Cajero", &march(), &worked, &config).unwrap();
        assert_eq!(first, second);
    }
}
