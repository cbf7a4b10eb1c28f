use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanCalcError;
use crate::repayment::{repayment_figures, validate_loan, LoanParameters, RepaymentOutput, RepaymentStyle};
use crate::time_value::{checked_add, checked_mul, periodic_rate, MONTHS_PER_YEAR};
use crate::types::*;
use crate::LoanCalcResult;

/// Rough stand-in for unknown current repayment schedules: the monthly
/// interest on existing debts is doubled to approximate what the borrower
/// pays today.
pub const CURRENT_REPAYMENT_MULTIPLIER: Decimal = dec!(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtCategory {
    CreditCard,
    PersonalLoan,
    CarLoan,
    Other,
}

/// Interest rates assumed for each category of existing debt, in percent p.a.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumedDebtRates {
    pub credit_card: Percent,
    pub personal_loan: Percent,
    pub car_loan: Percent,
    pub other: Percent,
}

impl Default for AssumedDebtRates {
    fn default() -> Self {
        AssumedDebtRates {
            credit_card: dec!(20.99),
            personal_loan: dec!(12.5),
            car_loan: dec!(9.5),
            other: dec!(15),
        }
    }
}

impl AssumedDebtRates {
    pub fn rate_for(&self, category: DebtCategory) -> Percent {
        match category {
            DebtCategory::CreditCard => self.credit_card,
            DebtCategory::PersonalLoan => self.personal_loan,
            DebtCategory::CarLoan => self.car_loan,
            DebtCategory::Other => self.other,
        }
    }
}

/// An existing debt to be rolled into the consolidation loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtItem {
    pub category: DebtCategory,
    pub balance: Money,
    /// Overrides the category's assumed rate when the borrower knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_percent: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub debts: Vec<DebtItem>,
    #[serde(default)]
    pub assumed_rates: AssumedDebtRates,
    pub consolidation_rate_percent: Percent,
    pub consolidation_term_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtBreakdown {
    pub category: DebtCategory,
    pub balance: Money,
    pub annual_rate_percent: Percent,
    pub monthly_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOutput {
    pub total_debt: Money,
    pub current_monthly_interest: Money,
    pub current_monthly_repayment_estimate: Money,
    pub consolidated: RepaymentOutput,
    pub monthly_savings: Money,
    pub annual_savings: Money,
    pub total_savings: Money,
    pub breakdown: Vec<DebtBreakdown>,
}

/// Estimate what a borrower saves by rolling existing debts into one loan.
///
/// Savings are clamped at zero.
pub fn calculate_consolidation(
    input: &ConsolidationInput,
) -> LoanCalcResult<ComputationOutput<ConsolidationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut breakdown = Vec::with_capacity(input.debts.len());
    let mut total_debt = Decimal::ZERO;
    let mut current_monthly_interest = Decimal::ZERO;

    for (i, debt) in input.debts.iter().enumerate() {
        if debt.balance < Decimal::ZERO {
            return Err(LoanCalcError::invalid(
                &format!("debts[{i}].balance"),
                "Debt balance cannot be negative",
            ));
        }
        let rate = debt
            .annual_rate_percent
            .unwrap_or_else(|| input.assumed_rates.rate_for(debt.category));
        if rate < Decimal::ZERO {
            return Err(LoanCalcError::invalid(
                &format!("debts[{i}].annual_rate_percent"),
                "Interest rate cannot be negative",
            ));
        }

        let monthly_interest = checked_mul(
            debt.balance,
            periodic_rate(rate, MONTHS_PER_YEAR),
            "debt monthly interest",
        )?;
        total_debt = checked_add(total_debt, debt.balance, "total debt")?;
        current_monthly_interest =
            checked_add(current_monthly_interest, monthly_interest, "current monthly interest")?;

        breakdown.push(DebtBreakdown {
            category: debt.category,
            balance: debt.balance,
            annual_rate_percent: rate,
            monthly_interest,
        });
    }

    let replacement = LoanParameters {
        principal: total_debt,
        annual_rate_percent: input.consolidation_rate_percent,
        term_years: input.consolidation_term_years,
        repayment_style: RepaymentStyle::PrincipalAndInterest,
    };
    validate_loan(&replacement)?;
    let consolidated = repayment_figures(&replacement)?;

    if total_debt.is_zero() {
        warnings.push("No debt balances entered; nothing to consolidate".into());
    }
    warnings.push(format!(
        "Current repayments are estimated as {CURRENT_REPAYMENT_MULTIPLIER}x the monthly interest on existing debts, not their actual schedules"
    ));

    let current_monthly_repayment_estimate = checked_mul(
        current_monthly_interest,
        CURRENT_REPAYMENT_MULTIPLIER,
        "current repayment estimate",
    )?;
    let monthly_savings =
        (current_monthly_repayment_estimate - consolidated.monthly_repayment).max(Decimal::ZERO);
    let annual_savings =
        checked_mul(monthly_savings, Decimal::from(MONTHS_PER_YEAR), "annual savings")?;
    let total_savings = checked_mul(
        monthly_savings,
        Decimal::from(consolidated.number_of_payments),
        "total savings",
    )?;

    if monthly_savings.is_zero() && !total_debt.is_zero() {
        warnings.push("Consolidation does not lower the estimated monthly repayment".into());
    }

    debug!(
        total_debt = %total_debt,
        consolidated_repayment = %consolidated.monthly_repayment,
        monthly_savings = %monthly_savings,
        "calculated debt consolidation"
    );

    let output = ConsolidationOutput {
        total_debt,
        current_monthly_interest,
        current_monthly_repayment_estimate,
        consolidated,
        monthly_savings,
        annual_savings,
        total_savings,
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Consolidation Savings Estimate",
        &serde_json::json!({
            "debts": input.debts.len(),
            "assumed_rates": input.assumed_rates,
            "consolidation_rate_percent": input.consolidation_rate_percent.to_string(),
            "consolidation_term_years": input.consolidation_term_years,
            "current_repayment_multiplier": CURRENT_REPAYMENT_MULTIPLIER.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
