use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::equity::{self, EquityInput, DEFAULT_MAX_LVR_PERCENT};

use crate::input;

/// Arguments for a usable equity calculation
#[derive(Args)]
pub struct EquityArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current property value
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Outstanding loan balance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub loan_balance: Decimal,

    /// Maximum loan-to-value ratio in percent
    #[arg(long, default_value_t = DEFAULT_MAX_LVR_PERCENT)]
    pub max_lvr: Decimal,
}

pub fn run_equity(args: EquityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let equity_input: EquityInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EquityInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            loan_balance: args.loan_balance,
            max_lvr_percent: args.max_lvr,
        },
    };
    let result = equity::calculate_equity(&equity_input)?;
    Ok(serde_json::to_value(result)?)
}
