use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use crate::error::LoanCalcError;
use crate::time_value::{checked_add, checked_mul};
use crate::types::*;
use crate::LoanCalcResult;

// ---------------------------------------------------------------------------
// Schedule types
// ---------------------------------------------------------------------------

/// One marginal bracket. The lower bound is the previous bracket's upper
/// bound (zero for the first); `None` marks the final, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyBracket {
    pub upper_bound: Option<Money>,
    pub marginal_rate: Rate,
}

/// First home buyer relief: a full waiver up to `full_exemption_threshold`,
/// `partial_concession_rate` of the duty up to `partial_threshold`, nothing above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstHomeConcession {
    pub full_exemption_threshold: Money,
    pub partial_threshold: Money,
    pub partial_concession_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyBracketSchedule {
    pub brackets: Vec<DutyBracket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_home_concession: Option<FirstHomeConcession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketContribution {
    pub lower_bound: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Money>,
    pub marginal_rate: Rate,
    pub taxable_amount: Money,
    pub duty: Money,
}

impl FirstHomeConcession {
    /// Amount of `standard_duty` waived for a first home at `property_price`.
    pub fn concession(&self, property_price: Money, standard_duty: Money) -> Money {
        let relief = if property_price <= self.full_exemption_threshold {
            standard_duty
        } else if property_price <= self.partial_threshold {
            standard_duty * self.partial_concession_rate
        } else {
            Decimal::ZERO
        };
        relief.min(standard_duty).max(Decimal::ZERO)
    }

    fn validate(&self) -> LoanCalcResult<()> {
        if self.full_exemption_threshold < Decimal::ZERO {
            return Err(LoanCalcError::invalid(
                "first_home_concession.full_exemption_threshold",
                "Threshold cannot be negative",
            ));
        }
        if self.partial_threshold < self.full_exemption_threshold {
            return Err(LoanCalcError::invalid(
                "first_home_concession.partial_threshold",
                "Partial threshold must not be below the full exemption threshold",
            ));
        }
        if self.partial_concession_rate < Decimal::ZERO || self.partial_concession_rate > Decimal::ONE {
            return Err(LoanCalcError::invalid(
                "first_home_concession.partial_concession_rate",
                "Concession rate must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

impl PropertyBracketSchedule {
    /// Check thresholds are positive and strictly increasing, rates lie in
    /// `0..=1`, and only the last bracket is unbounded.
    pub fn validate(&self) -> LoanCalcResult<()> {
        if self.brackets.is_empty() {
            return Err(LoanCalcError::invalid(
                "brackets",
                "Schedule must contain at least one bracket",
            ));
        }

        let last = self.brackets.len() - 1;
        let mut previous = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if bracket.marginal_rate < Decimal::ZERO || bracket.marginal_rate > Decimal::ONE {
                return Err(LoanCalcError::invalid(
                    &format!("brackets[{i}].marginal_rate"),
                    "Marginal rate must be between 0 and 1",
                ));
            }
            match bracket.upper_bound {
                Some(_) if i == last => {
                    return Err(LoanCalcError::invalid(
                        &format!("brackets[{i}].upper_bound"),
                        "Final bracket must be unbounded",
                    ));
                }
                None if i != last => {
                    return Err(LoanCalcError::invalid(
                        &format!("brackets[{i}].upper_bound"),
                        "Only the final bracket may be unbounded",
                    ));
                }
                Some(upper) if upper <= previous => {
                    return Err(LoanCalcError::invalid(
                        &format!("brackets[{i}].upper_bound"),
                        "Thresholds must be strictly increasing",
                    ));
                }
                Some(upper) => previous = upper,
                None => {}
            }
        }

        if let Some(concession) = &self.first_home_concession {
            concession.validate()?;
        }
        Ok(())
    }

    /// Per-bracket duty on `property_price`. Brackets wholly above the price
    /// are omitted.
    pub fn contributions(&self, property_price: Money) -> LoanCalcResult<Vec<BracketContribution>> {
        let mut out = Vec::new();
        let mut lower = Decimal::ZERO;
        for bracket in &self.brackets {
            if property_price <= lower {
                break;
            }
            let top = match bracket.upper_bound {
                Some(upper) => property_price.min(upper),
                None => property_price,
            };
            let taxable_amount = top - lower;
            out.push(BracketContribution {
                lower_bound: lower,
                upper_bound: bracket.upper_bound,
                marginal_rate: bracket.marginal_rate,
                taxable_amount,
                duty: checked_mul(taxable_amount, bracket.marginal_rate, "bracket duty")?,
            });
            match bracket.upper_bound {
                Some(upper) => lower = upper,
                None => break,
            }
        }
        Ok(out)
    }

    /// Duty before any concession.
    pub fn marginal_duty(&self, property_price: Money) -> LoanCalcResult<Money> {
        total_duty(&self.contributions(property_price)?)
    }
}

fn total_duty(contributions: &[BracketContribution]) -> LoanCalcResult<Money> {
    contributions
        .iter()
        .try_fold(Decimal::ZERO, |acc, c| checked_add(acc, c.duty, "standard duty"))
}

// ---------------------------------------------------------------------------
// Jurisdictions
// ---------------------------------------------------------------------------

/// Australian state or territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    NSW,
    VIC,
    QLD,
    WA,
    SA,
    TAS,
    ACT,
    NT,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 8] = [
        Jurisdiction::NSW,
        Jurisdiction::VIC,
        Jurisdiction::QLD,
        Jurisdiction::WA,
        Jurisdiction::SA,
        Jurisdiction::TAS,
        Jurisdiction::ACT,
        Jurisdiction::NT,
    ];

    /// Built-in general transfer duty rates, simplified to purely marginal
    /// brackets.
    pub fn schedule(&self) -> PropertyBracketSchedule {
        match self {
            Jurisdiction::NSW => schedule(
                &[
                    (Some(dec!(17_000)), dec!(0.0125)),
                    (Some(dec!(36_000)), dec!(0.015)),
                    (Some(dec!(97_000)), dec!(0.0175)),
                    (Some(dec!(364_000)), dec!(0.035)),
                    (Some(dec!(1_212_000)), dec!(0.045)),
                    (Some(dec!(3_636_000)), dec!(0.055)),
                    (None, dec!(0.07)),
                ],
                dec!(800_000),
                dec!(1_000_000),
            ),
            Jurisdiction::VIC => schedule(
                &[
                    (Some(dec!(25_000)), dec!(0.014)),
                    (Some(dec!(130_000)), dec!(0.024)),
                    (Some(dec!(960_000)), dec!(0.06)),
                    (Some(dec!(2_000_000)), dec!(0.055)),
                    (None, dec!(0.065)),
                ],
                dec!(600_000),
                dec!(750_000),
            ),
            Jurisdiction::QLD => schedule(
                &[
                    (Some(dec!(5_000)), dec!(0)),
                    (Some(dec!(75_000)), dec!(0.015)),
                    (Some(dec!(540_000)), dec!(0.035)),
                    (Some(dec!(1_000_000)), dec!(0.045)),
                    (None, dec!(0.0575)),
                ],
                dec!(700_000),
                dec!(800_000),
            ),
            Jurisdiction::WA => schedule(
                &[
                    (Some(dec!(120_000)), dec!(0.019)),
                    (Some(dec!(150_000)), dec!(0.0285)),
                    (Some(dec!(360_000)), dec!(0.038)),
                    (Some(dec!(725_000)), dec!(0.0475)),
                    (None, dec!(0.0515)),
                ],
                dec!(450_000),
                dec!(600_000),
            ),
            Jurisdiction::SA => schedule(
                &[
                    (Some(dec!(12_000)), dec!(0.01)),
                    (Some(dec!(30_000)), dec!(0.02)),
                    (Some(dec!(50_000)), dec!(0.03)),
                    (Some(dec!(100_000)), dec!(0.035)),
                    (Some(dec!(200_000)), dec!(0.04)),
                    (Some(dec!(250_000)), dec!(0.0425)),
                    (Some(dec!(300_000)), dec!(0.0475)),
                    (Some(dec!(500_000)), dec!(0.05)),
                    (None, dec!(0.055)),
                ],
                dec!(650_000),
                dec!(700_000),
            ),
            Jurisdiction::TAS => schedule(
                &[
                    (Some(dec!(3_000)), dec!(0.0167)),
                    (Some(dec!(25_000)), dec!(0.0175)),
                    (Some(dec!(75_000)), dec!(0.0225)),
                    (Some(dec!(200_000)), dec!(0.035)),
                    (Some(dec!(375_000)), dec!(0.04)),
                    (Some(dec!(725_000)), dec!(0.0425)),
                    (None, dec!(0.045)),
                ],
                dec!(750_000),
                dec!(750_000),
            ),
            Jurisdiction::ACT => schedule(
                &[
                    (Some(dec!(260_000)), dec!(0.004)),
                    (Some(dec!(346_000)), dec!(0.022)),
                    (Some(dec!(500_000)), dec!(0.034)),
                    (Some(dec!(750_000)), dec!(0.0432)),
                    (Some(dec!(1_000_000)), dec!(0.059)),
                    (Some(dec!(1_455_000)), dec!(0.064)),
                    (None, dec!(0.0454)),
                ],
                dec!(1_020_000),
                dec!(1_020_000),
            ),
            Jurisdiction::NT => schedule(
                &[
                    (Some(dec!(525_000)), dec!(0.045)),
                    (Some(dec!(3_000_000)), dec!(0.0495)),
                    (Some(dec!(5_000_000)), dec!(0.0575)),
                    (None, dec!(0.0595)),
                ],
                dec!(650_000),
                dec!(750_000),
            ),
        }
    }
}

fn schedule(rows: &[(Option<Money>, Rate)], full: Money, partial: Money) -> PropertyBracketSchedule {
    PropertyBracketSchedule {
        brackets: rows
            .iter()
            .map(|&(upper_bound, marginal_rate)| DutyBracket {
                upper_bound,
                marginal_rate,
            })
            .collect(),
        first_home_concession: Some(FirstHomeConcession {
            full_exemption_threshold: full,
            partial_threshold: partial,
            partial_concession_rate: dec!(0.5),
        }),
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Jurisdiction::NSW => "NSW",
            Jurisdiction::VIC => "VIC",
            Jurisdiction::QLD => "QLD",
            Jurisdiction::WA => "WA",
            Jurisdiction::SA => "SA",
            Jurisdiction::TAS => "TAS",
            Jurisdiction::ACT => "ACT",
            Jurisdiction::NT => "NT",
        };
        f.write_str(code)
    }
}

impl FromStr for Jurisdiction {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Jurisdiction::ALL
            .into_iter()
            .find(|j| j.to_string() == code)
            .ok_or_else(|| {
                LoanCalcError::invalid(
                    "jurisdiction",
                    format!("Unknown state or territory '{s}' (expected NSW, VIC, QLD, WA, SA, TAS, ACT or NT)"),
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampDutyInput {
    pub property_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
    /// Custom schedule; takes precedence over the jurisdiction's built-in table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<PropertyBracketSchedule>,
    #[serde(default)]
    pub first_home_buyer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampDutyOutput {
    pub property_price: Money,
    pub standard_duty: Money,
    pub concession: Money,
    pub final_duty: Money,
    /// Final duty as a share of the price (0 when the price is 0)
    pub effective_rate: Rate,
    pub brackets: Vec<BracketContribution>,
}

/// Marginal-bracket transfer duty on a property, less any first home buyer
/// concession the schedule carries. Final duty is never negative.
pub fn compute_stamp_duty(
    property_price: Money,
    schedule: &PropertyBracketSchedule,
    first_home_buyer: bool,
) -> LoanCalcResult<StampDutyOutput> {
    if property_price < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "property_price",
            "Property price cannot be negative",
        ));
    }
    schedule.validate()?;

    let brackets = schedule.contributions(property_price)?;
    let standard_duty = total_duty(&brackets)?;

    let concession = match (&schedule.first_home_concession, first_home_buyer) {
        (Some(c), true) => c.concession(property_price, standard_duty),
        _ => Decimal::ZERO,
    };
    let final_duty = (standard_duty - concession).max(Decimal::ZERO);

    let effective_rate = if property_price.is_zero() {
        Decimal::ZERO
    } else {
        final_duty / property_price
    };

    Ok(StampDutyOutput {
        property_price,
        standard_duty,
        concession,
        final_duty,
        effective_rate,
        brackets,
    })
}

/// Stamp duty for a jurisdiction's built-in schedule or a supplied one.
pub fn calculate_stamp_duty(
    input: &StampDutyInput,
) -> LoanCalcResult<ComputationOutput<StampDutyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = match (&input.schedule, input.jurisdiction) {
        (Some(custom), Some(j)) => {
            warnings.push(format!(
                "Custom schedule supplied; the built-in {j} rates were not used"
            ));
            custom.clone()
        }
        (Some(custom), None) => custom.clone(),
        (None, Some(j)) => j.schedule(),
        (None, None) => {
            return Err(LoanCalcError::invalid(
                "jurisdiction",
                "Either a jurisdiction or a custom schedule is required",
            ));
        }
    };

    if input.first_home_buyer && schedule.first_home_concession.is_none() {
        warnings.push("Schedule has no first home buyer concession; full duty applies".into());
    }

    let output = compute_stamp_duty(input.property_price, &schedule, input.first_home_buyer)?;

    debug!(
        jurisdiction = ?input.jurisdiction,
        property_price = %output.property_price,
        final_duty = %output.final_duty,
        "calculated stamp duty"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Marginal Bracket Transfer Duty",
        &serde_json::json!({
            "jurisdiction": input.jurisdiction,
            "custom_schedule": input.schedule.is_some(),
            "first_home_buyer": input.first_home_buyer,
            "first_home_concession": schedule.first_home_concession,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn two_band() -> PropertyBracketSchedule {
        PropertyBracketSchedule {
            brackets: vec![
                DutyBracket {
                    upper_bound: Some(dec!(100_000)),
                    marginal_rate: dec!(0.01),
                },
                DutyBracket {
                    upper_bound: None,
                    marginal_rate: dec!(0.05),
                },
            ],
            first_home_concession: None,
        }
    }

    #[test]
    fn test_marginal_sum() {
        // 100k at 1% + 50k at 5% = 1,000 + 2,500
        assert_eq!(two_band().marginal_duty(dec!(150_000)).unwrap(), dec!(3500));
        assert_eq!(two_band().marginal_duty(dec!(50_000)).unwrap(), dec!(500));
    }

    #[test]
    fn test_contributions_stop_at_price() {
        let parts = two_band().contributions(dec!(80_000)).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].taxable_amount, dec!(80_000));
        assert_eq!(parts[0].lower_bound, Decimal::ZERO);
    }

    #[test]
    fn test_nsw_600k() {
        let out = compute_stamp_duty(dec!(600_000), &Jurisdiction::NSW.schedule(), false).unwrap();
        // 212.50 + 285 + 1,067.50 + 9,345 + 10,620
        assert_eq!(out.standard_duty, dec!(21530));
        assert_eq!(out.final_duty, dec!(21530));
        assert_eq!(out.concession, Decimal::ZERO);
        assert_eq!(out.brackets.len(), 5);
    }

    #[test]
    fn test_nsw_first_home_full_waiver() {
        let out = compute_stamp_duty(dec!(600_000), &Jurisdiction::NSW.schedule(), true).unwrap();
        assert_eq!(out.final_duty, Decimal::ZERO);
        assert_eq!(out.concession, out.standard_duty);
        assert_eq!(out.effective_rate, Decimal::ZERO);
    }

    #[test]
    fn test_partial_band_halves_duty() {
        let schedule = Jurisdiction::VIC.schedule();
        let out = compute_stamp_duty(dec!(700_000), &schedule, true).unwrap();
        assert_eq!(out.concession, out.standard_duty * dec!(0.5));
        assert_eq!(out.final_duty, out.standard_duty - out.concession);
    }

    #[test]
    fn test_above_partial_band_no_concession() {
        let schedule = Jurisdiction::VIC.schedule();
        let out = compute_stamp_duty(dec!(900_000), &schedule, true).unwrap();
        assert_eq!(out.concession, Decimal::ZERO);
        assert_eq!(out.final_duty, out.standard_duty);
    }

    #[test]
    fn test_zero_price() {
        let out = compute_stamp_duty(Decimal::ZERO, &Jurisdiction::QLD.schedule(), false).unwrap();
        assert_eq!(out.final_duty, Decimal::ZERO);
        assert_eq!(out.effective_rate, Decimal::ZERO);
        assert!(out.brackets.is_empty());
    }

    #[test]
    fn test_effective_rate() {
        let out = compute_stamp_duty(dec!(150_000), &two_band(), false).unwrap();
        assert_eq!(out.effective_rate, dec!(3500) / dec!(150_000));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(compute_stamp_duty(dec!(-1), &two_band(), false).is_err());
    }

    #[test]
    fn test_all_builtin_schedules_valid() {
        for j in Jurisdiction::ALL {
            assert!(j.schedule().validate().is_ok(), "{j} schedule invalid");
        }
    }

    #[test]
    fn test_schedule_validation() {
        let mut s = two_band();
        s.brackets[1].upper_bound = Some(dec!(200_000));
        assert!(s.validate().is_err());

        let mut s = two_band();
        s.brackets[0].upper_bound = None;
        assert!(s.validate().is_err());

        let mut s = two_band();
        s.brackets.insert(
            1,
            DutyBracket {
                upper_bound: Some(dec!(90_000)),
                marginal_rate: dec!(0.02),
            },
        );
        assert!(s.validate().is_err());

        let mut s = two_band();
        s.brackets[0].marginal_rate = dec!(-0.01);
        assert!(s.validate().is_err());

        let s = PropertyBracketSchedule {
            brackets: vec![],
            first_home_concession: None,
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_marginal_rate_above_one_rejected() {
        let mut s = two_band();
        s.brackets[1].marginal_rate = dec!(1.5);
        match compute_stamp_duty(dec!(150_000), &s, false) {
            Err(LoanCalcError::InvalidParameter { field, .. }) => {
                assert_eq!(field, "brackets[1].marginal_rate")
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }

        // A full 100% band is still a valid schedule
        s.brackets[1].marginal_rate = Decimal::ONE;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_jurisdiction_parsing() {
        assert_eq!("nsw".parse::<Jurisdiction>().unwrap(), Jurisdiction::NSW);
        assert_eq!(" Qld ".parse::<Jurisdiction>().unwrap(), Jurisdiction::QLD);
        assert!("NZ".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn test_requires_schedule_source() {
        let input = StampDutyInput {
            property_price: dec!(500_000),
            jurisdiction: None,
            schedule: None,
            first_home_buyer: false,
        };
        assert!(calculate_stamp_duty(&input).is_err());
    }

    #[test]
    fn test_custom_schedule_overrides_jurisdiction() {
        let input = StampDutyInput {
            property_price: dec!(150_000),
            jurisdiction: Some(Jurisdiction::NSW),
            schedule: Some(two_band()),
            first_home_buyer: true,
        };
        let result = calculate_stamp_duty(&input).unwrap();
        assert_eq!(result.result.final_duty, dec!(3500));
        // Overridden rates and missing concession are both reported
        assert_eq!(result.warnings.len(), 2);
    }
}
