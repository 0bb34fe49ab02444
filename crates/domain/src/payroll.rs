//! Monthly payroll arithmetic.
//!
//! Pay is computed from recorded labor hours: eight hours make one
//! man-day (공수), a man-day is paid the profile's daily wage, and a flat
//! withholding percentage is taken off the gross.  All amounts are whole
//! KRW, rounded half away from zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MSG_NO_SALARY_SETTING;
use crate::DomainError;

/// Hours in one man-day.
pub const HOURS_PER_MAN_DAY: f64 = 8.0;

/// One salary setting row, reduced to what the calculation needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryTerms {
    pub daily_wage: i64,
    /// Percent, e.g. `3.3`.  Honoured to 0.01%.
    pub tax_rate: f64,
    pub effective_from: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollInput {
    pub total_hours: f64,
    pub daily_wage: i64,
    pub tax_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    pub total_hours: f64,
    pub man_days: f64,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub gross_pay: i64,
    pub tax_amount: i64,
    pub net_pay: i64,
}

/// Compute gross, withholding and net pay.
pub fn calculate(input: PayrollInput) -> PayrollBreakdown {
    let man_days = input.total_hours / HOURS_PER_MAN_DAY;
    let gross_pay = (input.total_hours * input.daily_wage as f64 / HOURS_PER_MAN_DAY).round() as i64;

    // Basis points keep the percentage step in integer arithmetic; i128
    // because gross × 10_000 leaves the i64 range for large wages.
    let basis_points = (input.tax_rate * 100.0).round() as i128;
    let tax = div_round(i128::from(gross_pay) * basis_points, 10_000);
    // |tax| <= |gross| while the rate is within 0..=100%.
    let tax_amount = i64::try_from(tax).unwrap_or(gross_pay);

    PayrollBreakdown {
        total_hours: input.total_hours,
        man_days,
        daily_wage: input.daily_wage,
        tax_rate: input.tax_rate,
        gross_pay,
        tax_amount,
        net_pay: gross_pay - tax_amount,
    }
}

/// Integer division rounding half away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// First and last calendar day of `year`-`month`.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DomainError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation("올바르지 않은 연월입니다"))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| DomainError::validation("올바르지 않은 연월입니다"))?;
    let last = next.pred_opt().unwrap_or(first);
    Ok((first, last))
}

/// The setting in force for the month: latest `effective_from` on or
/// before the month's last day.
pub fn effective_terms(
    settings: &[SalaryTerms],
    year: i32,
    month: u32,
) -> Result<SalaryTerms, DomainError> {
    let (_, last) = month_bounds(year, month)?;
    settings
        .iter()
        .filter(|s| s.effective_from <= last)
        .max_by_key(|s| s.effective_from)
        .copied()
        .ok_or_else(|| DomainError::not_found(MSG_NO_SALARY_SETTING))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_month_of_days() {
        // 20 days × 8h at 150,000 won, 3.3% withholding.
        let b = calculate(PayrollInput { total_hours: 160.0, daily_wage: 150_000, tax_rate: 3.3 });
        assert_eq!(b.man_days, 20.0);
        assert_eq!(b.gross_pay, 3_000_000);
        assert_eq!(b.tax_amount, 99_000);
        assert_eq!(b.net_pay, 2_901_000);
    }

    #[test]
    fn partial_days_are_prorated() {
        let b = calculate(PayrollInput { total_hours: 12.0, daily_wage: 170_000, tax_rate: 0.0 });
        assert_eq!(b.man_days, 1.5);
        assert_eq!(b.gross_pay, 255_000);
        assert_eq!(b.tax_amount, 0);
        assert_eq!(b.net_pay, 255_000);
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 3.3% of 15,015 = 495.495 -> 495; 3.3% of 15,150 = 499.95 -> 500
        let b = calculate(PayrollInput { total_hours: 8.0, daily_wage: 15_015, tax_rate: 3.3 });
        assert_eq!(b.tax_amount, 495);
        let b = calculate(PayrollInput { total_hours: 8.0, daily_wage: 15_150, tax_rate: 3.3 });
        assert_eq!(b.tax_amount, 500);
        // 10% of 1,005 = 100.5 -> 101
        let b = calculate(PayrollInput { total_hours: 8.0, daily_wage: 1_005, tax_rate: 10.0 });
        assert_eq!(b.tax_amount, 101);
    }

    #[test]
    fn largest_wages_do_not_overflow() {
        let b = calculate(PayrollInput {
            total_hours: 8.0,
            daily_wage: 10_000_000_000_000_000,
            tax_rate: 100.0,
        });
        assert_eq!(b.gross_pay, 10_000_000_000_000_000);
        assert_eq!(b.tax_amount, b.gross_pay);
        assert_eq!(b.net_pay, 0);

        // A month of maximum-wage days at the validation cap.
        let b = calculate(PayrollInput {
            total_hours: 24.0 * 31.0,
            daily_wage: crate::validation::MAX_DAILY_WAGE,
            tax_rate: 3.3,
        });
        assert_eq!(b.gross_pay, 93 * crate::validation::MAX_DAILY_WAGE);
        assert_eq!(b.tax_amount, 306_900_000);
    }

    #[test]
    fn zero_hours_is_a_zero_payslip() {
        let b = calculate(PayrollInput { total_hours: 0.0, daily_wage: 150_000, tax_rate: 3.3 });
        assert_eq!((b.gross_pay, b.tax_amount, b.net_pay), (0, 0, 0));
    }

    #[test]
    fn month_bounds_handle_december_and_leap_years() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(2025, 12).unwrap(), (date(2025, 12, 1), date(2025, 12, 31)));
        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn latest_setting_before_month_end_wins() {
        let settings = [
            SalaryTerms { daily_wage: 140_000, tax_rate: 3.3, effective_from: date(2025, 1, 1) },
            SalaryTerms { daily_wage: 150_000, tax_rate: 3.3, effective_from: date(2025, 3, 15) },
            SalaryTerms { daily_wage: 160_000, tax_rate: 3.3, effective_from: date(2025, 4, 1) },
        ];
        assert_eq!(effective_terms(&settings, 2025, 2).unwrap().daily_wage, 140_000);
        assert_eq!(effective_terms(&settings, 2025, 3).unwrap().daily_wage, 150_000);
        assert_eq!(effective_terms(&settings, 2025, 4).unwrap().daily_wage, 160_000);
    }

    #[test]
    fn no_setting_before_month_is_not_found() {
        let settings = [SalaryTerms { daily_wage: 1, tax_rate: 0.0, effective_from: date(2025, 6, 1) }];
        let err = effective_terms(&settings, 2025, 5).unwrap_err();
        assert_eq!(err, DomainError::NotFound(MSG_NO_SALARY_SETTING.to_string()));
    }
}
