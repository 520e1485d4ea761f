//! Bracket walk, credits and clawback

use super::{Credits, LevelTax, MarginalRates, TaxAssessment, TaxInput};
use crate::assumptions::{JurisdictionParams, OasParams, TaxParams};
use crate::income::IncomeCategories;

/// Age from which the age amount is claimed
pub const AGE_AMOUNT_AGE: u32 = 65;

/// Assess federal and provincial tax for one person
pub fn assess(input: &TaxInput, params: &JurisdictionParams) -> TaxAssessment {
    let taxable_income = input.income.taxable_income(params).max(0.0);

    let federal = assess_level(&params.federal, input, taxable_income, params);
    let provincial = assess_level(&params.provincial, input, taxable_income, params);

    let basis = input.clawback_income.unwrap_or(taxable_income);
    let clawback = oas_clawback(input.oas_gross, basis, &params.oas);

    TaxAssessment {
        taxable_income,
        federal,
        provincial,
        net_tax: federal.net_tax + provincial.net_tax,
        oas_clawback: clawback,
        marginal_rate: federal.bracket_rate + provincial.bracket_rate,
        marginal: marginal_rates(params, taxable_income),
    }
}

/// OAS recovery tax: `min(OAS, max(0, income - threshold) * rate)`
pub fn oas_clawback(oas_gross: f64, income: f64, params: &OasParams) -> f64 {
    let excess = (income - params.clawback_threshold).max(0.0);
    (excess * params.clawback_rate).min(oas_gross.max(0.0))
}

fn assess_level(
    level: &TaxParams,
    input: &TaxInput,
    taxable_income: f64,
    params: &JurisdictionParams,
) -> LevelTax {
    let gross_tax = level.gross_tax(taxable_income);
    let credits = credits(level, input, taxable_income, params);
    let applied_credits = credits.total().min(gross_tax);

    LevelTax {
        gross_tax,
        credits,
        applied_credits,
        net_tax: (gross_tax - applied_credits).max(0.0),
        bracket_rate: level.bracket_rate(taxable_income),
    }
}

fn credits(
    level: &TaxParams,
    input: &TaxInput,
    taxable_income: f64,
    params: &JurisdictionParams,
) -> Credits {
    let income: &IncomeCategories = &input.income;

    let age = if input.age >= AGE_AMOUNT_AGE {
        let reduction = (taxable_income - level.age_amount_threshold).max(0.0) * level.age_amount_taper;
        (level.age_amount - reduction).max(0.0) * level.age_amount_rate
    } else {
        0.0
    };

    Credits {
        basic_personal: level.basic_personal_amount * level.basic_personal_rate,
        age,
        pension: income.pension_eligible.max(0.0).min(level.pension_credit_cap) * level.pension_credit_rate,
        eligible_dividend: income.grossed_up_eligible(params) * level.eligible_dividend_credit_rate,
        non_eligible_dividend: income.grossed_up_non_eligible(params)
            * level.non_eligible_dividend_credit_rate,
    }
}

fn marginal_rates(params: &JurisdictionParams, taxable_income: f64) -> MarginalRates {
    let mut rates = MarginalRates::default();
    for level in [&params.federal, &params.provincial] {
        let rate = level.bracket_rate(taxable_income);
        rates.ordinary += rate;
        rates.eligible_dividend +=
            (1.0 + params.dividend_gross_up.eligible) * (rate - level.eligible_dividend_credit_rate);
        rates.non_eligible_dividend += (1.0 + params.dividend_gross_up.non_eligible)
            * (rate - level.non_eligible_dividend_credit_rate);
        rates.capital_gain += params.capital_gains_inclusion * rate;
    }
    rates
}
