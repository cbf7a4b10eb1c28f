use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanCalcError;
use crate::repayment::{repayment_figures, validate_loan, LoanParameters, RepaymentOutput, RepaymentStyle};
use crate::time_value::{checked_mul, MONTHS_PER_YEAR};
use crate::types::*;
use crate::LoanCalcResult;

/// Input for an offset account comparison. Both sides are priced as
/// principal & interest loans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    pub offset_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetOutput {
    /// Interest-bearing balance once the offset is applied
    pub effective_principal: Money,
    pub with_offset: RepaymentOutput,
    pub without_offset: RepaymentOutput,
    pub monthly_savings: Money,
    pub annual_savings: Money,
    pub total_savings: Money,
    pub interest_saved: Money,
}

/// Compare repayments on a loan with and without an offset balance held against it.
pub fn calculate_offset(input: &OffsetInput) -> LoanCalcResult<ComputationOutput<OffsetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.offset_balance < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "offset_balance",
            "Offset balance cannot be negative",
        ));
    }

    let without = LoanParameters {
        principal: input.principal,
        annual_rate_percent: input.annual_rate_percent,
        term_years: input.term_years,
        repayment_style: RepaymentStyle::PrincipalAndInterest,
    };
    validate_loan(&without)?;

    let effective_principal = (input.principal - input.offset_balance).max(Decimal::ZERO);
    if input.offset_balance >= input.principal && !input.principal.is_zero() {
        warnings.push(format!(
            "Offset balance of {} covers the whole loan; no interest is charged",
            input.offset_balance
        ));
    }

    let with = LoanParameters {
        principal: effective_principal,
        ..without.clone()
    };

    let with_offset = repayment_figures(&with)?;
    let without_offset = repayment_figures(&without)?;

    let monthly_savings = without_offset.monthly_repayment - with_offset.monthly_repayment;
    let annual_savings =
        checked_mul(monthly_savings, Decimal::from(MONTHS_PER_YEAR), "annual savings")?;
    let total_savings = checked_mul(
        monthly_savings,
        Decimal::from(without_offset.number_of_payments),
        "total savings",
    )?;
    let interest_saved = without_offset.total_interest - with_offset.total_interest;

    debug!(
        effective_principal = %effective_principal,
        monthly_savings = %monthly_savings,
        "calculated offset savings"
    );

    let output = OffsetOutput {
        effective_principal,
        with_offset,
        without_offset,
        monthly_savings,
        annual_savings,
        total_savings,
        interest_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Offset Account Repayment Comparison",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "offset_balance": input.offset_balance.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "term_years": input.term_years,
            "repayment_style": RepaymentStyle::PrincipalAndInterest,
        }),
        warnings,
        elapsed,
        output,
    ))
}
