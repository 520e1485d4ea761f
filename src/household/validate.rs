//! Household validation, run before any year is simulated

use super::accounts::{BucketedAccount, EarlyRrif};
use super::data::{Household, Person};
use crate::error::InputValidationError;

pub const CPP_MIN_START: u32 = 60;
pub const CPP_MAX_START: u32 = 70;
pub const OAS_MIN_START: u32 = 65;
pub const OAS_MAX_START: u32 = 70;
pub const MAX_AGE: u32 = 120;

/// Reject households the engine cannot simulate
pub fn validate_household(household: &Household) -> Result<(), InputValidationError> {
    for person in household.persons() {
        validate_person(person)?;
    }

    let oldest = household.oldest_age();
    if household.end_age <= oldest || household.end_age > MAX_AGE {
        return Err(InputValidationError::EndAgeNotAfterStart {
            end_age: household.end_age,
            current_age: oldest,
        });
    }

    check_rate("spending_inflation", household.spending_inflation)?;
    check_rate("general_inflation", household.general_inflation)?;

    if !(0.0..=0.5).contains(&household.income_split_fraction) {
        return Err(InputValidationError::InvalidSplitFraction(
            household.income_split_fraction,
        ));
    }
    if household.gap_tolerance < 0.0 || !household.gap_tolerance.is_finite() {
        return Err(InputValidationError::NegativeGapTolerance(household.gap_tolerance));
    }

    let spending = &household.spending;
    if spending.go_go_end_age > spending.slow_go_end_age {
        return Err(InputValidationError::SpendingPhases {
            go_go: spending.go_go_end_age,
            slow_go: spending.slow_go_end_age,
        });
    }
    for (field, value) in [
        ("spending.go_go", spending.go_go),
        ("spending.slow_go", spending.slow_go),
        ("spending.no_go", spending.no_go),
    ] {
        non_negative(&household.p1.name, field, value)?;
    }

    household
        .strategy
        .validate()
        .map_err(|(field, value)| InputValidationError::InvalidRate {
            field: field.to_string(),
            value,
        })
}

fn validate_person(person: &Person) -> Result<(), InputValidationError> {
    if person.age > MAX_AGE {
        return Err(out_of_range(person, "current", person.age, 0, MAX_AGE));
    }
    if !(CPP_MIN_START..=CPP_MAX_START).contains(&person.cpp.start_age) {
        return Err(out_of_range(person, "CPP", person.cpp.start_age, CPP_MIN_START, CPP_MAX_START));
    }
    if !(OAS_MIN_START..=OAS_MAX_START).contains(&person.oas.start_age) {
        return Err(out_of_range(person, "OAS", person.oas.start_age, OAS_MIN_START, OAS_MAX_START));
    }

    let name = person.name.as_str();
    non_negative(name, "cpp", person.cpp.amount_at_65)?;
    non_negative(name, "oas", person.oas.amount_at_65)?;
    non_negative(name, "tfsa", person.tfsa.balance)?;
    non_negative(name, "tfsa_room", person.tfsa.room)?;
    non_negative(name, "rrif", person.rrif.balance)?;
    check_rate("tfsa.yield_rate", person.tfsa.yield_rate)?;
    check_rate("rrif.yield_rate", person.rrif.yield_rate)?;

    validate_buckets(name, "non_registered", &person.non_registered)?;

    let corp = &person.corporate;
    validate_buckets(name, "corporate", &corp.buckets)?;
    non_negative(name, "corporate.rdtoh", corp.rdtoh)?;
    non_negative(name, "corporate.cda", corp.cda)?;
    for (field, value) in [
        ("corporate.rdtoh_rate", corp.rdtoh_rate),
        ("corporate.rdtoh_refund_rate", corp.rdtoh_refund_rate),
        ("corporate.passive_tax_rate", corp.passive_tax_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(InputValidationError::InvalidRate {
                field: field.to_string(),
                value,
            });
        }
    }

    for pension in &person.pensions {
        non_negative(name, "pension", pension.amount)?;
    }
    for stream in &person.other_income {
        non_negative(name, "other_income", stream.amount)?;
    }

    match person.early_rrif {
        Some(EarlyRrif::FixedAmount(amount)) => non_negative(name, "early_rrif", amount)?,
        Some(EarlyRrif::Percent(rate)) if !(0.0..=1.0).contains(&rate) => {
            return Err(InputValidationError::InvalidRate {
                field: "early_rrif".to_string(),
                value: rate,
            });
        }
        _ => {}
    }
    Ok(())
}

fn validate_buckets(
    person: &str,
    account: &str,
    buckets: &BucketedAccount,
) -> Result<(), InputValidationError> {
    for (label, bucket) in ["cash", "gic", "invested"].iter().zip(buckets.buckets()) {
        non_negative(person, &format!("{account}.{label}"), bucket.market_value)?;
        non_negative(person, &format!("{account}.{label}.acb"), bucket.acb)?;
        if bucket.acb > bucket.market_value {
            return Err(InputValidationError::AcbExceedsMarketValue {
                person: person.to_string(),
                account: format!("{account}.{label}"),
                acb: bucket.acb,
                market_value: bucket.market_value,
            });
        }
        for (component, rate) in bucket.yields.components() {
            check_rate(&format!("{account}.{label}.{component}"), rate)?;
        }
    }
    Ok(())
}

fn non_negative(person: &str, account: &str, value: f64) -> Result<(), InputValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(InputValidationError::NegativeBalance {
            person: person.to_string(),
            account: account.to_string(),
            value,
        })
    }
}

/// Rates are decimals; anything outside [-1, 1] was almost certainly a percentage
fn check_rate(field: &str, value: f64) -> Result<(), InputValidationError> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InputValidationError::InvalidRate {
            field: field.to_string(),
            value,
        })
    }
}

fn out_of_range(person: &Person, what: &str, age: u32, min: u32, max: u32) -> InputValidationError {
    InputValidationError::StartAgeOutOfRange {
        person: person.name.clone(),
        what: what.to_string(),
        age,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::{Bucket, YieldMix};

    fn household() -> Household {
        let mut person = Person::new("Alex", 65);
        person.tfsa.balance = 100_000.0;
        Household::single(person, 2025, 90)
    }

    #[test]
    fn test_valid_household_passes() {
        assert!(validate_household(&household()).is_ok());
    }

    #[test]
    fn test_rejects_negative_balance() {
        let mut h = household();
        h.p1.rrif.balance = -1.0;
        assert!(matches!(
            validate_household(&h),
            Err(InputValidationError::NegativeBalance { .. })
        ));
    }

    #[test]
    fn test_rejects_acb_above_market_value() {
        let mut h = household();
        h.p1.non_registered.invested = Bucket::new(100_000.0, 200_000.0, YieldMix::default());
        assert!(matches!(
            validate_household(&h),
            Err(InputValidationError::AcbExceedsMarketValue { .. })
        ));

        let mut h = household();
        h.p1.corporate.buckets.cash = Bucket::new(10_000.0, 10_000.0, YieldMix::default());
        assert!(validate_household(&h).is_ok());
    }

    #[test]
    fn test_rejects_percentage_rates() {
        let mut h = household();
        h.p1.tfsa.yield_rate = 5.0;
        assert!(matches!(
            validate_household(&h),
            Err(InputValidationError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_ages() {
        let mut h = household();
        h.p1.cpp.start_age = 72;
        assert!(matches!(
            validate_household(&h),
            Err(InputValidationError::StartAgeOutOfRange { .. })
        ));

        let mut h = household();
        h.end_age = 65;
        assert!(matches!(
            validate_household(&h),
            Err(InputValidationError::EndAgeNotAfterStart { .. })
        ));
    }

    #[test]
    fn test_rejects_split_and_tolerance() {
        let mut h = household();
        h.income_split_fraction = 0.6;
        assert_eq!(
            validate_household(&h),
            Err(InputValidationError::InvalidSplitFraction(0.6))
        );

        let mut h = household();
        h.gap_tolerance = -5.0;
        assert_eq!(
            validate_household(&h),
            Err(InputValidationError::NegativeGapTolerance(-5.0))
        );
    }
}
