//! Government benefits: CPP, OAS and GIS
//!
//! Amounts are gated by start age and indexed annually. The OAS recovery tax
//! is assessed by the tax engine, not here.

use serde::{Deserialize, Serialize};

use crate::assumptions::{GisParams, OasParams};
use crate::household::BenefitElection;

/// CPP reduction per year started before 65
pub const CPP_EARLY_REDUCTION: f64 = 0.072;
/// CPP increase per year deferred past 65
pub const CPP_DEFERRAL_INCREASE: f64 = 0.084;
/// OAS increase per year deferred past 65
pub const OAS_DEFERRAL_INCREASE: f64 = 0.072;

pub const OAS_TOP_UP_AGE: u32 = 75;

/// GIS is paid to OAS recipients from this age
pub const GIS_MIN_AGE: u32 = 65;

/// Multiplier on the age-65 CPP amount for a start age (60 to 70)
pub fn cpp_start_factor(start_age: u32) -> f64 {
    let start_age = start_age.clamp(60, 70) as f64;
    if start_age < 65.0 {
        1.0 - CPP_EARLY_REDUCTION * (65.0 - start_age)
    } else {
        1.0 + CPP_DEFERRAL_INCREASE * (start_age - 65.0)
    }
}

/// Multiplier on the age-65 OAS amount for a start age (65 to 70)
pub fn oas_start_factor(start_age: u32) -> f64 {
    1.0 + OAS_DEFERRAL_INCREASE * (start_age.clamp(65, 70) - 65) as f64
}

/// Indexed benefit in pay at `current_age`
///
/// Zero before the start age. Indexing runs from the start age, but never
/// for more years than the simulation has run: a benefit already in pay at
/// the start year has `base_amount` as its current amount.
pub fn benefit(
    base_amount: f64,
    start_age: u32,
    current_age: u32,
    years_since_sim_start: u32,
    inflation: f64,
) -> f64 {
    if current_age < start_age {
        return 0.0;
    }
    let years = (current_age - start_age).min(years_since_sim_start);
    base_amount * (1.0 + inflation).powi(years as i32)
}

/// Base amount for an election; benefits already in pay are taken as-is
fn elected_base(election: &BenefitElection, age_at_start: u32, factor: fn(u32) -> f64) -> f64 {
    if election.start_age <= age_at_start {
        election.amount_at_65
    } else {
        election.amount_at_65 * factor(election.start_age)
    }
}

/// Gross CPP for a year
pub fn cpp_amount(
    election: &BenefitElection,
    age_at_start: u32,
    years_since_sim_start: u32,
    inflation: f64,
) -> f64 {
    let base = elected_base(election, age_at_start, cpp_start_factor);
    benefit(
        base,
        election.start_age,
        age_at_start + years_since_sim_start,
        years_since_sim_start,
        inflation,
    )
}

/// Gross OAS for a year, including the permanent top-up from 75
pub fn oas_amount(
    election: &BenefitElection,
    params: &OasParams,
    age_at_start: u32,
    years_since_sim_start: u32,
    inflation: f64,
) -> f64 {
    let current_age = age_at_start + years_since_sim_start;
    let base = elected_base(election, age_at_start, oas_start_factor);
    let amount = benefit(base, election.start_age, current_age, years_since_sim_start, inflation);
    if current_age >= OAS_TOP_UP_AGE {
        amount * (1.0 + params.age_75_increase)
    } else {
        amount
    }
}

/// Household income tested for GIS, excluding OAS
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GisIncome {
    pub employment: f64,
    /// All other non-OAS income
    pub other: f64,
}

/// Income counted against GIS after the employment exemptions
pub fn gis_counted_income(params: &GisParams, income: &GisIncome) -> f64 {
    let employment = income.employment.max(0.0);
    let fully_exempt = employment.min(params.employment_exemption);
    let partly_exempt = (employment - fully_exempt).min(params.partial_exemption_band)
        * params.partial_exemption_rate;
    let counted_employment = employment - fully_exempt - partly_exempt;
    income.other.max(0.0) + counted_employment
}

/// Annual GIS for one OAS recipient
pub fn gis_amount(params: &GisParams, couple: bool, income: &GisIncome) -> f64 {
    let schedule = if couple { &params.couple } else { &params.single };
    let counted = gis_counted_income(params, income);
    if counted >= schedule.income_threshold {
        return 0.0;
    }
    schedule
        .max_benefit
        .min((schedule.max_benefit - params.taper * counted).max(0.0))
}
