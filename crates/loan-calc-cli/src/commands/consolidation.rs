use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::consolidation::{
    self, AssumedDebtRates, ConsolidationInput, DebtCategory, DebtItem,
};

use crate::input;

/// Arguments for a debt consolidation estimate
#[derive(Args)]
pub struct ConsolidationArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Credit card balance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub credit_card: Decimal,

    /// Personal loan balance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub personal_loan: Decimal,

    /// Car loan balance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub car_loan: Decimal,

    /// Other debt balance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub other: Decimal,

    /// Consolidation loan rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Consolidation loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,
}

pub fn run_consolidation(args: ConsolidationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let consolidation_input: ConsolidationInput =
        match input::read_structured(args.input.as_deref())? {
            Some(parsed) => parsed,
            None => {
                let debts = [
                    (DebtCategory::CreditCard, args.credit_card),
                    (DebtCategory::PersonalLoan, args.personal_loan),
                    (DebtCategory::CarLoan, args.car_loan),
                    (DebtCategory::Other, args.other),
                ]
                .into_iter()
                .filter(|(_, balance)| !balance.is_zero())
                .map(|(category, balance)| DebtItem {
                    category,
                    balance,
                    annual_rate_percent: None,
                })
                .collect();

                ConsolidationInput {
                    debts,
                    assumed_rates: AssumedDebtRates::default(),
                    consolidation_rate_percent: args
                        .rate
                        .ok_or("--rate is required (or provide --input)")?,
                    consolidation_term_years: args.term_years,
                }
            }
        };
    let result = consolidation::calculate_consolidation(&consolidation_input)?;
    Ok(serde_json::to_value(result)?)
}
