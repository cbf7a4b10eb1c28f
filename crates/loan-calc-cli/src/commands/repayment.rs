use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::repayment::{
    self, AmortisationScheduleInput, LoanParameters, RepaymentStyle,
};

use crate::input;

/// Loan flags shared by the repayment and schedule commands
#[derive(Args)]
pub struct LoanFlags {
    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Interest-only repayments instead of principal & interest
    #[arg(long)]
    pub interest_only: bool,
}

impl LoanFlags {
    fn to_params(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        Ok(LoanParameters {
            principal,
            annual_rate_percent: rate,
            term_years: self.term_years,
            repayment_style: if self.interest_only {
                RepaymentStyle::InterestOnly
            } else {
                RepaymentStyle::PrincipalAndInterest
            },
        })
    }
}

/// Arguments for a loan repayment calculation
#[derive(Args)]
pub struct RepaymentArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,
}

pub fn run_repayment(args: RepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: LoanParameters = match input::read_structured(args.input.as_deref())? {
        Some(params) => params,
        None => args.loan.to_params()?,
    };
    let result = repayment::calculate_repayment(&params)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a monthly amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Settlement date (YYYY-MM-DD); repayments fall monthly after it
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortisationScheduleInput =
        match input::read_structured(args.input.as_deref())? {
            Some(parsed) => parsed,
            None => AmortisationScheduleInput {
                loan: args.loan.to_params()?,
                start_date: args.start_date,
            },
        };
    let result = repayment::build_amortisation_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
