//! Carry state threaded from one simulated year to the next

use crate::benefits::GisIncome;
use crate::household::{BucketedAccount, CorporateAccount, Household, Person, RegisteredAccount, TfsaAccount};

/// Balances and history for one person at the start of a year
#[derive(Debug, Clone, PartialEq)]
pub struct PersonState {
    /// Attained age this year
    pub age: u32,

    /// Age at the start year (benefit indexing is measured from here)
    pub age_at_start: u32,

    pub tfsa: TfsaAccount,

    /// RRSP below the conversion age, RRIF from it
    pub rrif: RegisteredAccount,

    pub non_registered: BucketedAccount,

    pub corporate: CorporateAccount,

    /// Taxable income last year, used for a prior-year clawback basis
    pub prior_taxable: Option<f64>,
}

impl PersonState {
    pub fn from_person(person: &Person) -> Self {
        Self {
            age: person.age,
            age_at_start: person.age,
            tfsa: person.tfsa,
            rrif: person.rrif,
            non_registered: person.non_registered,
            corporate: person.corporate.clone(),
            prior_taxable: None,
        }
    }

    pub fn net_worth(&self) -> f64 {
        self.tfsa.balance + self.rrif.balance + self.non_registered.total() + self.corporate.total()
    }
}

/// State consumed and returned by each year's step
#[derive(Debug, Clone, PartialEq)]
pub struct CarryState {
    /// Calendar year about to be simulated
    pub year: i32,

    /// Years since the start year
    pub years_elapsed: u32,

    pub people: Vec<PersonState>,

    pub cumulative_tax: f64,

    pub cumulative_spending: f64,

    /// Household income last year, for the GIS income test
    pub prior_gis_income: Option<GisIncome>,
}

impl CarryState {
    /// Initialize from the household at the start year
    pub fn from_household(household: &Household) -> Self {
        Self {
            year: household.start_year,
            years_elapsed: 0,
            people: household.persons().into_iter().map(PersonState::from_person).collect(),
            cumulative_tax: 0.0,
            cumulative_spending: 0.0,
            prior_gis_income: None,
        }
    }

    /// Move to the next year; balances are already end-of-year
    pub fn advance(&mut self) {
        self.year += 1;
        self.years_elapsed += 1;
        for person in &mut self.people {
            person.age += 1;
        }
    }

    pub fn net_worth(&self) -> f64 {
        self.people.iter().map(PersonState::net_worth).sum()
    }
}
