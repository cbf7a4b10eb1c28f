use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::offset::{self, OffsetInput};

use crate::input;

/// Arguments for an offset account comparison
#[derive(Args)]
pub struct OffsetArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Balance held in the offset account
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub offset: Decimal,
}

pub fn run_offset(args: OffsetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let offset_input: OffsetInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => OffsetInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            offset_balance: args.offset,
        },
    };
    let result = offset::calculate_offset(&offset_input)?;
    Ok(serde_json::to_value(result)?)
}
