use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::types::{Money, Percent, Rate};
use crate::LoanCalcResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Convert a quoted annual percentage into a periodic decimal rate.
///
/// `periodic_rate(dec!(6), 12)` is 0.005.
pub fn periodic_rate(annual_rate_percent: Percent, periods_per_year: u32) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(periods_per_year)
}

fn overflow(context: &str) -> LoanCalcError {
    LoanCalcError::Overflow {
        context: context.to_string(),
    }
}

/// `a * b`, or `Overflow` when the product leaves the decimal range.
pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

/// `a + b`, or `Overflow` when the sum leaves the decimal range.
pub fn checked_add(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn checked_div(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    if b.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: context.to_string(),
        });
    }
    a.checked_div(b).ok_or_else(|| overflow(context))
}

/// Compound growth factor (1 + r)^n.
pub fn compound_factor(rate: Rate, nper: u32) -> LoanCalcResult<Decimal> {
    let base = checked_add(Decimal::ONE, rate, "compound factor base")?;
    base.checked_powi(i64::from(nper))
        .ok_or_else(|| LoanCalcError::Overflow {
            context: format!("compound factor (1 + {rate})^{nper}"),
        })
}

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> LoanCalcResult<Money> {
    if nper == 0 {
        return Err(LoanCalcError::InvalidParameter {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        let total = checked_add(present_value, future_value, "PMT principal")?;
        return Ok(-total / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = checked_div(factor - Decimal::ONE, rate, "PMT annuity factor")?;

    if annuity_factor.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let grown = checked_mul(present_value, factor, "PMT present value growth")?;
    let target = checked_add(grown, future_value, "PMT present value growth")?;
    Ok(-checked_div(target, annuity_factor, "PMT annuity factor")?)
}

/// Level repayment that amortises `principal` to zero over `nper` periods.
///
/// Zero rate falls back to straight-line `principal / nper`.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> LoanCalcResult<Money> {
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(-pmt(rate, nper, principal, Decimal::ZERO)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periodic_rate() {
        assert_eq!(periodic_rate(dec!(6), 12), dec!(0.005));
        assert_eq!(periodic_rate(dec!(0), 12), Decimal::ZERO);
    }

    #[test]
    fn test_pmt_sign_convention() {
        // 100k over 10 periods at 10% ≈ -16,274.54
        let result = pmt(dec!(0.10), 10, dec!(100000), dec!(0)).unwrap();
        assert!((result - dec!(-16274.54)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate_is_straight_line() {
        let result = annuity_payment(dec!(12000), Decimal::ZERO, 12).unwrap();
        assert_eq!(result, dec!(1000));
    }

    #[test]
    fn test_annuity_payment_mortgage() {
        // 500k, 6.5% p.a. monthly, 30 years ≈ 3,160.34
        let rate = periodic_rate(dec!(6.5), MONTHS_PER_YEAR);
        let result = annuity_payment(dec!(500000), rate, 360).unwrap();
        assert!((result - dec!(3160.34)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_periods_error() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), dec!(0)).is_err());
    }

    #[test]
    fn test_checked_mul_reports_overflow() {
        match checked_mul(Decimal::MAX, dec!(2), "doubling") {
            Err(LoanCalcError::Overflow { context }) => assert_eq!(context, "doubling"),
            other => panic!("expected Overflow, got {other:?}"),
        }
        assert_eq!(checked_mul(dec!(3), dec!(4), "product").unwrap(), dec!(12));
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert!(matches!(
            checked_div(dec!(1), Decimal::ZERO, "ratio"),
            Err(LoanCalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_pmt_huge_present_value_overflows() {
        // (1.01)^120 ≈ 3.3, so the grown balance leaves the decimal range
        let pv = Decimal::MAX / dec!(2);
        assert!(matches!(
            pmt(dec!(0.01), 120, pv, Decimal::ZERO),
            Err(LoanCalcError::Overflow { .. })
        ));
    }
}
