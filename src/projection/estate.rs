//! Tax at death on the terminal year's closing balances
//!
//! Registered balances are taxed as ordinary income, remaining
//! non-registered gains are realised, the corporation is wound up as a
//! dividend (CDA first) and the TFSA passes tax-free. Personal tax at death
//! is the increment over the final year's own tax.

use serde::{Deserialize, Serialize};

use super::state::CarryState;
use crate::assumptions::JurisdictionParams;
use crate::income;
use crate::tax::{assess, TaxInput};

/// Terminal amounts for one person
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonEstate {
    pub registered: f64,
    pub unrealized_gain: f64,
    pub corporate_payout: f64,
    pub tax_free: f64,
    /// Increment in personal net tax over the final year
    pub personal_tax: f64,
    /// Corporate tax on wind-up gains, net of the RDTOH refund
    pub corporate_tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstateRecord {
    pub gross_estate: f64,
    pub taxes_at_death: f64,
    pub after_tax_legacy: f64,
    pub people: Vec<PersonEstate>,
}

/// Estate for end-of-year `state`; `final_inputs` are the final year's tax
/// inputs in person order
pub fn terminal_estate(state: &CarryState, final_inputs: &[TaxInput], params: &JurisdictionParams) -> EstateRecord {
    let people: Vec<PersonEstate> = state
        .people
        .iter()
        .zip(final_inputs)
        .map(|(person, input)| {
            let corporate = &person.corporate;
            let payout = corporate.total();
            let dividend = corporate.preview_dividend(payout);
            let route = corporate.route_capital_gains_to_shareholder;

            let mut death_income = input.income;
            death_income.ordinary += person.rrif.balance;
            death_income.capital_gains += person.non_registered.unrealized_gain();
            death_income += income::corporate_dividend(&dividend, route);
            death_income.tax_free += person.tfsa.balance;

            let before = assess(input, params);
            let after = assess(
                &TaxInput {
                    income: death_income,
                    ..*input
                },
                params,
            );

            let corporate_gain = if route { 0.0 } else { dividend.realized_gain.max(0.0) };
            let corporate_tax = corporate.passive_tax_rate * params.capital_gains_inclusion * corporate_gain
                - dividend.rdtoh_refund;

            PersonEstate {
                registered: person.rrif.balance,
                unrealized_gain: person.non_registered.unrealized_gain(),
                corporate_payout: payout,
                tax_free: person.tfsa.balance,
                personal_tax: (after.net_tax - before.net_tax).max(0.0),
                corporate_tax,
            }
        })
        .collect();

    let gross_estate = state.net_worth();
    let taxes_at_death: f64 = people.iter().map(|p| p.personal_tax + p.corporate_tax).sum();

    EstateRecord {
        gross_estate,
        taxes_at_death,
        after_tax_legacy: gross_estate - taxes_at_death,
        people,
    }
}
