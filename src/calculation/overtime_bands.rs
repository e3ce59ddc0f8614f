//! Overtime band partitioning.
//!
//! Splits the hours worked in a pay period into regular hours, hours paid
//! with a 50% premium, and hours paid with a 100% premium.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::OvertimePolicy;

/// Worked hours split into the three pay bands.
///
/// `regular + overtime_50 + overtime_100` always equals the input hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBands {
    /// Hours up to the standard threshold.
    pub regular: Decimal,
    /// Hours between the standard threshold and the 100% threshold.
    pub overtime_50: Decimal,
    /// Hours beyond the 100% threshold.
    pub overtime_100: Decimal,
}

/// Partitions worked hours into pay bands.
///
/// Both thresholds of `policy` are monthly figures and are multiplied by
/// `month_fraction` (1 for a whole month) before being applied. No rounding
/// is performed.
///
/// # Examples
///
/// ```
/// use chango_payroll::calculation::partition_hours;
/// use chango_payroll::config::OvertimePolicy;
/// use rust_decimal::Decimal;
///
/// let policy = OvertimePolicy {
///     standard_monthly_hours: Decimal::from(160),
///     overtime_100_threshold: Decimal::from(190),
///     multiplier_50: Decimal::new(15, 1),
///     multiplier_100: Decimal::from(2),
/// };
///
/// let bands = partition_hours(Decimal::from(200), &policy, Decimal::ONE);
/// assert_eq!(bands.regular, Decimal::from(160));
/// assert_eq!(bands.overtime_50, Decimal::from(30));
/// assert_eq!(bands.overtime_100, Decimal::from(10));
/// ```
pub fn partition_hours(
    worked_hours: Decimal,
    policy: &OvertimePolicy,
    month_fraction: Decimal,
) -> HourBands {
    let worked_hours = worked_hours.max(Decimal::ZERO);
    let standard = policy.standard_monthly_hours * month_fraction;
    let threshold_100 = (policy.overtime_100_threshold * month_fraction).max(standard);

    let regular = worked_hours.min(standard);
    let overtime_50 = (worked_hours.min(threshold_100) - standard).max(Decimal::ZERO);
    let overtime_100 = (worked_hours - threshold_100).max(Decimal::ZERO);

    HourBands {
        regular,
        overtime_50,
        overtime_100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn policy() -> OvertimePolicy {
        OvertimePolicy {
            standard_monthly_hours: dec("160"),
            overtime_100_threshold: dec("190"),
            multiplier_50: dec("1.5"),
            multiplier_100: dec("2.0"),
        }
    }

    #[test]
    fn test_under_standard_hours_is_all_regular() {
        let bands = partition_hours(dec("120.5"), &policy(), Decimal::ONE);
        assert_eq!(bands.regular, dec("120.5"));
        assert_eq!(bands.overtime_50, Decimal::ZERO);
        assert_eq!(bands.overtime_100, Decimal::ZERO);
    }

    #[test]
    fn test_exactly_standard_hours_has_no_overtime() {
        let bands = partition_hours(dec("160"), &policy(), Decimal::ONE);
        assert_eq!(bands.regular, dec("160"));
        assert_eq!(bands.overtime_50, Decimal::ZERO);
    }

    #[test]
    fn test_ten_hours_over_standard_fall_in_50_band() {
        let bands = partition_hours(dec("170"), &policy(), Decimal::ONE);
        assert_eq!(bands.regular, dec("160"));
        assert_eq!(bands.overtime_50, dec("10"));
        assert_eq!(bands.overtime_100, Decimal::ZERO);
    }

    #[test]
    fn test_hours_beyond_second_threshold_fall_in_100_band() {
        let bands = partition_hours(dec("195.25"), &policy(), Decimal::ONE);
        assert_eq!(bands.regular, dec("160"));
        assert_eq!(bands.overtime_50, dec("30"));
        assert_eq!(bands.overtime_100, dec("5.25"));
    }

    #[test]
    fn test_half_month_halves_thresholds() {
        let bands = partition_hours(dec("90"), &policy(), dec("0.5"));
        assert_eq!(bands.regular, dec("80"));
        assert_eq!(bands.overtime_50, dec("10"));
        assert_eq!(bands.overtime_100, Decimal::ZERO);
    }

    #[test]
    fn test_collapsed_thresholds_skip_50_band() {
        let mut policy = policy();
        policy.overtime_100_threshold = dec("160");
        let bands = partition_hours(dec("170"), &policy, Decimal::ONE);
        assert_eq!(bands.overtime_50, Decimal::ZERO);
        assert_eq!(bands.overtime_100, dec("10"));
    }

    proptest! {
        #[test]
        fn prop_bands_sum_to_worked_hours(
            worked_cents in 0i64..100_000,
            standard in 1i64..300,
            extra in 0i64..100,
        ) {
            let worked = Decimal::new(worked_cents, 2);
            let policy = OvertimePolicy {
                standard_monthly_hours: Decimal::from(standard),
                overtime_100_threshold: Decimal::from(standard + extra),
                multiplier_50: dec("1.5"),
                multiplier_100: dec("2.0"),
            };

            let bands = partition_hours(worked, &policy, Decimal::ONE);

            prop_assert_eq!(bands.regular + bands.overtime_50 + bands.overtime_100, worked);
            prop_assert!(bands.regular >= Decimal::ZERO);
            prop_assert!(bands.overtime_50 >= Decimal::ZERO);
            prop_assert!(bands.overtime_100 >= Decimal::ZERO);
            prop_assert!(bands.regular <= policy.standard_monthly_hours);
        }
    }
}
