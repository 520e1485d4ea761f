//! Classification of inflows into the tax engine's six income categories

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::assumptions::JurisdictionParams;
use crate::household::{CorporateDividend, DividendClass, Distributions, IncomeKind, Person, Sale};

/// Age from which registered withdrawals qualify for the pension credit
pub const PENSION_CREDIT_AGE: u32 = 65;

/// Income by tax treatment, before gross-up and inclusion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeCategories {
    pub ordinary: f64,
    pub pension_eligible: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
    /// Realised capital gains, before the inclusion rate
    pub capital_gains: f64,
    pub tax_free: f64,
}

impl IncomeCategories {
    /// Ordinary + pension + grossed-up dividends + included gains
    pub fn taxable_income(&self, params: &JurisdictionParams) -> f64 {
        self.ordinary
            + self.pension_eligible
            + self.eligible_dividends * (1.0 + params.dividend_gross_up.eligible)
            + self.non_eligible_dividends * (1.0 + params.dividend_gross_up.non_eligible)
            + params.capital_gains_inclusion * self.capital_gains
    }

    pub fn grossed_up_eligible(&self, params: &JurisdictionParams) -> f64 {
        self.eligible_dividends * (1.0 + params.dividend_gross_up.eligible)
    }

    pub fn grossed_up_non_eligible(&self, params: &JurisdictionParams) -> f64 {
        self.non_eligible_dividends * (1.0 + params.dividend_gross_up.non_eligible)
    }

    pub fn total(&self) -> f64 {
        self.ordinary
            + self.pension_eligible
            + self.eligible_dividends
            + self.non_eligible_dividends
            + self.capital_gains
            + self.tax_free
    }
}

impl AddAssign for IncomeCategories {
    fn add_assign(&mut self, other: Self) {
        self.ordinary += other.ordinary;
        self.pension_eligible += other.pension_eligible;
        self.eligible_dividends += other.eligible_dividends;
        self.non_eligible_dividends += other.non_eligible_dividends;
        self.capital_gains += other.capital_gains;
        self.tax_free += other.tax_free;
    }
}

/// RRIF/RRSP withdrawal: pension-eligible from 65, ordinary before
pub fn registered_withdrawal(amount: f64, age: u32) -> IncomeCategories {
    if age >= PENSION_CREDIT_AGE {
        IncomeCategories {
            pension_eligible: amount,
            ..Default::default()
        }
    } else {
        IncomeCategories {
            ordinary: amount,
            ..Default::default()
        }
    }
}

pub fn tfsa_withdrawal(amount: f64) -> IncomeCategories {
    IncomeCategories {
        tax_free: amount,
        ..Default::default()
    }
}

/// Only the gain on a non-registered sale is income
pub fn non_registered_sale(sale: &Sale) -> IncomeCategories {
    IncomeCategories {
        capital_gains: sale.realized_gain,
        ..Default::default()
    }
}

/// Corporate payout: capital dividend tax-free, the rest by declared class
pub fn corporate_dividend(dividend: &CorporateDividend, route_gains: bool) -> IncomeCategories {
    let mut income = IncomeCategories {
        tax_free: dividend.capital_dividend,
        ..Default::default()
    };
    match dividend.class {
        DividendClass::Eligible => income.eligible_dividends = dividend.taxable_dividend,
        DividendClass::NonEligible => income.non_eligible_dividends = dividend.taxable_dividend,
    }
    if route_gains {
        income.capital_gains = dividend.realized_gain;
    }
    income
}

/// Fund distributions by category
pub fn distributions(d: &Distributions) -> IncomeCategories {
    IncomeCategories {
        ordinary: d.interest,
        eligible_dividends: d.eligible_dividend,
        non_eligible_dividends: d.non_eligible_dividend,
        capital_gains: d.capital_gain,
        tax_free: d.return_of_capital,
        ..Default::default()
    }
}

/// Recurring, non-discretionary inflows for one person in one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringIncome {
    pub age: u32,
    pub cpp: f64,
    pub oas_gross: f64,
    pub gis: f64,
    pub pension_income: f64,
    pub employment_income: f64,
    /// Rental, interest and other streams
    pub other_income: f64,
    /// Mandatory and planned registered draws
    pub rrif_mandatory: f64,
    pub distributions: Distributions,
    /// Distributions arrive as cash rather than being reinvested
    pub distributions_paid_out: bool,
    /// Corporate cash/GIC interest paid out as an interest-type dividend
    pub corporate_interest: f64,
}

impl RecurringIncome {
    pub fn categories(&self) -> IncomeCategories {
        let mut income = IncomeCategories {
            ordinary: self.cpp
                + self.oas_gross
                + self.employment_income
                + self.other_income
                + self.corporate_interest,
            pension_eligible: self.pension_income,
            tax_free: self.gis,
            ..Default::default()
        };
        income += registered_withdrawal(self.rrif_mandatory, self.age);
        income += distributions(&self.distributions);
        income
    }

    /// Gross cash received before tax and clawback
    pub fn cash(&self) -> f64 {
        let distributions = if self.distributions_paid_out {
            self.distributions.total()
        } else {
            0.0
        };
        self.cpp
            + self.oas_gross
            + self.gis
            + self.pension_income
            + self.employment_income
            + self.other_income
            + self.rrif_mandatory
            + self.corporate_interest
            + distributions
    }
}

/// Pension and other-income streams paid at `age`
///
/// Indexed streams grow with general inflation from the start year.
/// Returns (pension, employment, other).
pub fn stream_income(person: &Person, age: u32, years_since_start: u32, inflation: f64) -> (f64, f64, f64) {
    let index = (1.0 + inflation).powi(years_since_start as i32);
    let indexed = |amount: f64, flag: bool| if flag { amount * index } else { amount };

    let pension: f64 = person
        .pensions
        .iter()
        .filter(|p| age >= p.start_age)
        .map(|p| indexed(p.amount, p.indexed))
        .sum();

    let mut employment = 0.0;
    let mut other = 0.0;
    for stream in &person.other_income {
        if !stream.active_at(age, person.retirement_age()) {
            continue;
        }
        let amount = indexed(stream.amount, stream.indexed);
        match stream.kind {
            IncomeKind::Employment => employment += amount,
            IncomeKind::Rental | IncomeKind::Interest | IncomeKind::Other => other += amount,
        }
    }
    (pension, employment, other)
}
