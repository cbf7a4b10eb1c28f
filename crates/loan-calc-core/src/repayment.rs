use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanCalcError;
use crate::time_value::{
    annuity_payment, checked_add, checked_mul, periodic_rate, MONTHS_PER_YEAR,
};
use crate::types::*;
use crate::LoanCalcResult;

/// Calendar-average weeks per month used to quote weekly repayments.
pub const WEEKS_PER_MONTH: Decimal = dec!(4.33);

/// Calendar-average fortnights per month used to quote fortnightly repayments.
pub const FORTNIGHTS_PER_MONTH: Decimal = dec!(2.17);

/// Longest loan a month-by-month schedule will be generated for.
pub const MAX_SCHEDULE_YEARS: u32 = 100;

/// How each repayment is applied to the loan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentStyle {
    /// Each repayment covers the month's interest and reduces the principal
    #[default]
    PrincipalAndInterest,
    /// Repayments cover interest only; the principal is repaid at the end of the term
    InterestOnly,
}

/// Input for a standard home loan repayment calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub repayment_style: RepaymentStyle,
}

/// Repayment figures for a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentOutput {
    pub monthly_repayment: Money,
    pub fortnightly_repayment: Money,
    pub weekly_repayment: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
    pub number_of_payments: u32,
}

pub(crate) fn validate_loan(params: &LoanParameters) -> LoanCalcResult<()> {
    if params.principal < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "principal",
            "Loan amount cannot be negative",
        ));
    }
    if params.annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if params.term_years < 1 {
        return Err(LoanCalcError::invalid(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }
    Ok(())
}

/// Repayment figures without the output envelope. Inputs must already be validated.
pub(crate) fn repayment_figures(params: &LoanParameters) -> LoanCalcResult<RepaymentOutput> {
    let monthly_rate = periodic_rate(params.annual_rate_percent, MONTHS_PER_YEAR);
    let number_of_payments = params
        .term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| LoanCalcError::invalid("term_years", "Loan term is too long"))?;
    let n = Decimal::from(number_of_payments);

    let (payment, total_interest, total_repayment) = match params.repayment_style {
        RepaymentStyle::PrincipalAndInterest if monthly_rate.is_zero() => {
            // Straight-line; totals are exact so interest is exactly zero
            (params.principal / n, Decimal::ZERO, params.principal)
        }
        RepaymentStyle::PrincipalAndInterest => {
            let payment = annuity_payment(params.principal, monthly_rate, number_of_payments)?;
            let total_repayment = checked_mul(payment, n, "total repayment")?;
            (payment, total_repayment - params.principal, total_repayment)
        }
        RepaymentStyle::InterestOnly => {
            let payment =
                checked_mul(params.principal, monthly_rate, "interest-only repayment")?;
            let total_interest = checked_mul(payment, n, "total interest")?;
            let total_repayment =
                checked_add(params.principal, total_interest, "total repayment")?;
            (payment, total_interest, total_repayment)
        }
    };

    Ok(RepaymentOutput {
        monthly_repayment: payment,
        fortnightly_repayment: payment / FORTNIGHTS_PER_MONTH,
        weekly_repayment: payment / WEEKS_PER_MONTH,
        total_interest,
        total_repayment,
        number_of_payments,
    })
}

/// Monthly, fortnightly and weekly repayments plus lifetime interest for a
/// fixed-rate loan.
///
/// Results are full precision; rounding to cents or dollars is left to the
/// caller.
pub fn calculate_repayment(
    params: &LoanParameters,
) -> LoanCalcResult<ComputationOutput<RepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan(params)?;

    if params.principal.is_zero() {
        warnings.push("Loan amount is zero; all repayments are zero".into());
    }

    let output = repayment_figures(params)?;
    debug!(
        principal = %params.principal,
        rate = %params.annual_rate_percent,
        term_years = params.term_years,
        monthly_repayment = %output.monthly_repayment,
        "calculated loan repayment"
    );

    let methodology = match params.repayment_style {
        RepaymentStyle::PrincipalAndInterest => "Principal & Interest Annuity Repayment",
        RepaymentStyle::InterestOnly => "Interest-Only Repayment",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_rate_percent": params.annual_rate_percent.to_string(),
            "term_years": params.term_years,
            "compounding": "monthly",
            "weeks_per_month": WEEKS_PER_MONTH.to_string(),
            "fortnights_per_month": FORTNIGHTS_PER_MONTH.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Amortisation schedule
// ---------------------------------------------------------------------------

/// Input for a month-by-month amortisation schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortisationScheduleInput {
    #[serde(flatten)]
    pub loan: LoanParameters,
    /// Settlement date; the first repayment falls one month later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// A single monthly repayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortisationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub repayment: Money,
    pub closing_balance: Money,
}

/// Yearly roll-up of the monthly rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortisationYear {
    pub year: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortisationScheduleOutput {
    pub monthly_repayment: Money,
    pub rows: Vec<AmortisationRow>,
    pub years: Vec<AmortisationYear>,
    pub total_interest: Money,
    pub total_principal: Money,
}

/// Build a month-by-month amortisation schedule.
///
/// The final row absorbs any rounding residue so the loan always closes at
/// zero. Interest-only loans repay the full principal in the final month.
pub fn build_amortisation_schedule(
    input: &AmortisationScheduleInput,
) -> LoanCalcResult<ComputationOutput<AmortisationScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let loan = &input.loan;

    validate_loan(loan)?;
    if loan.term_years > MAX_SCHEDULE_YEARS {
        return Err(LoanCalcError::invalid(
            "term_years",
            format!("Schedules are limited to {MAX_SCHEDULE_YEARS} years"),
        ));
    }

    let figures = repayment_figures(loan)?;
    let monthly_rate = periodic_rate(loan.annual_rate_percent, MONTHS_PER_YEAR);
    let n = figures.number_of_payments;

    let mut rows = Vec::with_capacity(n as usize);
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for period in 1..=n {
        let opening = balance;
        let interest = checked_mul(opening, monthly_rate, "schedule interest")?;

        let principal = if period == n {
            opening
        } else {
            match loan.repayment_style {
                RepaymentStyle::PrincipalAndInterest => {
                    (figures.monthly_repayment - interest).min(opening)
                }
                RepaymentStyle::InterestOnly => Decimal::ZERO,
            }
        };

        let payment_date = match input.start_date {
            Some(d) => Some(d.checked_add_months(Months::new(period)).ok_or_else(|| {
                LoanCalcError::invalid("start_date", "Repayment dates run past the calendar range")
            })?),
            None => None,
        };

        balance = opening - principal;
        total_interest = checked_add(total_interest, interest, "schedule total interest")?;
        total_principal = checked_add(total_principal, principal, "schedule total principal")?;
        let repayment = checked_add(interest, principal, "schedule repayment")?;

        rows.push(AmortisationRow {
            period,
            payment_date,
            opening_balance: opening,
            interest,
            principal,
            repayment,
            closing_balance: balance,
        });
    }

    if loan.repayment_style == RepaymentStyle::InterestOnly && !loan.principal.is_zero() {
        warnings.push(format!(
            "Interest-only: the full principal of {} falls due in month {n}",
            loan.principal
        ));
    }

    let years = roll_up_years(&rows);

    debug!(
        periods = n,
        total_interest = %total_interest,
        "built amortisation schedule"
    );

    let output = AmortisationScheduleOutput {
        monthly_repayment: figures.monthly_repayment,
        rows,
        years,
        total_interest,
        total_principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly Amortisation Schedule",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_rate_percent": loan.annual_rate_percent.to_string(),
            "term_years": loan.term_years,
            "repayment_style": loan.repayment_style,
            "start_date": input.start_date,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn roll_up_years(rows: &[AmortisationRow]) -> Vec<AmortisationYear> {
    rows.chunks(MONTHS_PER_YEAR as usize)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            Some(AmortisationYear {
                year: i as u32 + 1,
                opening_balance: first.opening_balance,
                interest: chunk.iter().map(|r| r.interest).sum(),
                principal: chunk.iter().map(|r| r.principal).sum(),
                closing_balance: last.closing_balance,
            })
        })
        .collect()
}
