use clap::Args;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use loan_calc_core::stamp_duty::{self, Jurisdiction, StampDutyInput};

use crate::input;

/// Arguments for a stamp duty calculation
#[derive(Args)]
pub struct StampDutyArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the property
    #[arg(long)]
    pub price: Option<Decimal>,

    /// State or territory (NSW, VIC, QLD, WA, SA, TAS, ACT, NT)
    #[arg(long)]
    pub state: Option<Jurisdiction>,

    /// Apply the first home buyer concession
    #[arg(long)]
    pub first_home_buyer: bool,
}

pub fn run_stamp_duty(args: StampDutyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let duty_input: StampDutyInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => StampDutyInput {
            property_price: args.price.ok_or("--price is required (or provide --input)")?,
            jurisdiction: Some(args.state.ok_or("--state is required (or provide --input)")?),
            schedule: None,
            first_home_buyer: args.first_home_buyer,
        },
    };
    let result = stamp_duty::calculate_stamp_duty(&duty_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Built-in bracket schedules keyed by state code.
pub fn run_jurisdictions() -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedules = Map::new();
    for j in Jurisdiction::ALL {
        schedules.insert(j.to_string(), serde_json::to_value(j.schedule())?);
    }
    Ok(Value::Object(schedules))
}
