use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use loan_calc_core::stamp_duty::{Jurisdiction, PropertyBracketSchedule};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a JSON request, run the calculator and serialise its output.
fn call_json<I, O, F>(input_json: &str, calc: F) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
    F: FnOnce(&I) -> loan_calc_core::LoanCalcResult<O>,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Repayments
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_repayment(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::repayment::calculate_repayment)
}

#[napi]
pub fn amortisation_schedule(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::repayment::build_amortisation_schedule)
}

#[napi]
pub fn calculate_offset(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::offset::calculate_offset)
}

#[napi]
pub fn calculate_consolidation(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::consolidation::calculate_consolidation)
}

#[napi]
pub fn calculate_equity(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::equity::calculate_equity)
}

// ---------------------------------------------------------------------------
// Stamp duty
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_stamp_duty(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_calc_core::stamp_duty::calculate_stamp_duty)
}

/// Built-in bracket schedule for a state code such as "NSW".
#[napi]
pub fn stamp_duty_schedule(state: String) -> NapiResult<String> {
    let jurisdiction: Jurisdiction = state.parse().map_err(to_napi_error)?;
    let schedule: PropertyBracketSchedule = jurisdiction.schedule();
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

/// Quick duty figure for calculator sliders; the price is a decimal string.
#[napi]
pub fn stamp_duty_for_price(price: String, state: String, first_home_buyer: bool) -> NapiResult<String> {
    let price: Decimal = price.parse().map_err(to_napi_error)?;
    let jurisdiction: Jurisdiction = state.parse().map_err(to_napi_error)?;
    let output = loan_calc_core::stamp_duty::compute_stamp_duty(
        price,
        &jurisdiction.schedule(),
        first_home_buyer,
    )
    .map_err(to_napi_error)?;
    Ok(output.final_duty.to_string())
}
