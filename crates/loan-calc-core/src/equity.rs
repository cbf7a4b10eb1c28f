use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanCalcError;
use crate::time_value::{checked_div, checked_mul};
use crate::types::*;
use crate::LoanCalcResult;

/// Lenders typically cap borrowing at 80% of the property value before
/// mortgage insurance applies.
pub const DEFAULT_MAX_LVR_PERCENT: Decimal = dec!(80);

fn default_max_lvr() -> Percent {
    DEFAULT_MAX_LVR_PERCENT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityInput {
    pub property_value: Money,
    pub loan_balance: Money,
    #[serde(default = "default_max_lvr")]
    pub max_lvr_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityOutput {
    /// Loan balance as a share of property value
    pub current_lvr: Rate,
    /// Property value less the loan; negative when the loan is underwater
    pub total_equity: Money,
    pub max_borrowing: Money,
    /// Equity a lender would release at the maximum LVR
    pub usable_equity: Money,
}

pub fn calculate_equity(input: &EquityInput) -> LoanCalcResult<ComputationOutput<EquityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_value <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "property_value",
            "Property value must be positive",
        ));
    }
    if input.loan_balance < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "loan_balance",
            "Loan balance cannot be negative",
        ));
    }
    if input.max_lvr_percent <= Decimal::ZERO || input.max_lvr_percent > dec!(100) {
        return Err(LoanCalcError::invalid(
            "max_lvr_percent",
            "Maximum LVR must be above 0 and at most 100",
        ));
    }

    let current_lvr = checked_div(input.loan_balance, input.property_value, "current LVR")?;
    let total_equity = input.property_value - input.loan_balance;
    let max_borrowing = checked_mul(
        input.property_value,
        input.max_lvr_percent / dec!(100),
        "maximum borrowing",
    )?;
    let usable_equity = (max_borrowing - input.loan_balance).max(Decimal::ZERO);

    if current_lvr > DEFAULT_MAX_LVR_PERCENT / dec!(100) {
        let lvr_percent = checked_mul(current_lvr, dec!(100), "current LVR")?;
        warnings.push(format!(
            "Current LVR of {}% is above {DEFAULT_MAX_LVR_PERCENT}%; lenders mortgage insurance may apply",
            lvr_percent.round_dp(2)
        ));
    }
    if total_equity < Decimal::ZERO {
        warnings.push("Loan balance exceeds property value".into());
    }

    debug!(
        current_lvr = %current_lvr,
        usable_equity = %usable_equity,
        "calculated usable equity"
    );

    let output = EquityOutput {
        current_lvr,
        total_equity,
        max_borrowing,
        usable_equity,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Usable Equity at Maximum LVR",
        &serde_json::json!({
            "property_value": input.property_value.to_string(),
            "loan_balance": input.loan_balance.to_string(),
            "max_lvr_percent": input.max_lvr_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
