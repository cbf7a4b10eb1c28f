#![cfg(feature = "offset")]

use loan_calc_core::offset::{calculate_offset, OffsetInput};
use loan_calc_core::repayment::{calculate_repayment, LoanParameters, RepaymentStyle};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn offset_input(offset_balance: Decimal) -> OffsetInput {
    OffsetInput {
        principal: dec!(500000),
        annual_rate_percent: dec!(6.5),
        term_years: 30,
        offset_balance,
    }
}

fn monthly(principal: Decimal) -> Decimal {
    calculate_repayment(&LoanParameters {
        principal,
        annual_rate_percent: dec!(6.5),
        term_years: 30,
        repayment_style: RepaymentStyle::PrincipalAndInterest,
    })
    .unwrap()
    .result
    .monthly_repayment
}

#[test]
fn test_50k_offset_on_500k_loan() {
    let out = calculate_offset(&offset_input(dec!(50000))).unwrap().result;
    assert_eq!(out.effective_principal, dec!(450000));
    assert!(out.monthly_savings > Decimal::ZERO);
    assert_eq!(out.monthly_savings, monthly(dec!(500000)) - monthly(dec!(450000)));
    assert_eq!(out.without_offset.monthly_repayment, monthly(dec!(500000)));
}

#[test]
fn test_savings_non_decreasing_in_offset_balance() {
    let mut previous = Decimal::ZERO;
    let mut offset = Decimal::ZERO;
    while offset <= dec!(600000) {
        let out = calculate_offset(&offset_input(offset)).unwrap().result;
        assert!(
            out.monthly_savings >= previous,
            "savings fell at offset {offset}: {} < {previous}",
            out.monthly_savings
        );
        assert!(out.monthly_savings >= Decimal::ZERO);
        assert!(out.interest_saved >= Decimal::ZERO);
        previous = out.monthly_savings;
        offset += dec!(25000);
    }
}

#[test]
fn test_offset_priced_as_principal_and_interest() {
    let result = calculate_offset(&offset_input(dec!(100000))).unwrap();
    assert_eq!(
        result.assumptions["repayment_style"],
        serde_json::json!("PrincipalAndInterest")
    );
}
