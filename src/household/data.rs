//! Person and household inputs

use serde::{Deserialize, Serialize};

use super::accounts::{BucketedAccount, CorporateAccount, EarlyRrif, RegisteredAccount, TfsaAccount};
use crate::withdrawal::Strategy;

/// CPP or OAS election
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenefitElection {
    /// Annual amount payable at 65 (or currently in pay if already started)
    pub amount_at_65: f64,
    pub start_age: u32,
}

impl BenefitElection {
    pub fn none(start_age: u32) -> Self {
        Self {
            amount_at_65: 0.0,
            start_age,
        }
    }
}

/// Defined-benefit or other fixed pension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pension {
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    pub start_age: u32,
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeKind {
    Employment,
    Rental,
    Interest,
    Other,
}

/// Non-pension income stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherIncome {
    pub kind: IncomeKind,
    pub amount: f64,
    #[serde(default)]
    pub start_age: u32,
    /// Last age (inclusive) the stream pays; employment and rental
    /// streams default to the CPP start age
    #[serde(default)]
    pub end_age: Option<u32>,
    #[serde(default)]
    pub indexed: bool,
}

impl OtherIncome {
    /// Whether the stream pays at `age`
    pub fn active_at(&self, age: u32, retirement_age: u32) -> bool {
        if age < self.start_age {
            return false;
        }
        match (self.end_age, self.kind) {
            (Some(end), _) => age <= end,
            (None, IncomeKind::Employment | IncomeKind::Rental) => age < retirement_age,
            (None, _) => true,
        }
    }
}

/// One retiree
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    /// Age at the start year
    pub age: u32,
    pub cpp: BenefitElection,
    pub oas: BenefitElection,
    pub tfsa: TfsaAccount,
    pub rrif: RegisteredAccount,
    pub non_registered: BucketedAccount,
    pub corporate: CorporateAccount,
    pub pensions: Vec<Pension>,
    pub other_income: Vec<OtherIncome>,
    pub early_rrif: Option<EarlyRrif>,
}

impl Person {
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
            cpp: BenefitElection::none(65),
            oas: BenefitElection::none(65),
            tfsa: TfsaAccount::default(),
            rrif: RegisteredAccount::default(),
            non_registered: BucketedAccount::default(),
            corporate: CorporateAccount::default(),
            pensions: Vec::new(),
            other_income: Vec::new(),
            early_rrif: None,
        }
    }

    /// Retirement age for streams without an explicit end age
    pub fn retirement_age(&self) -> u32 {
        self.cpp.start_age
    }

    pub fn net_worth(&self) -> f64 {
        self.tfsa.balance + self.rrif.balance + self.non_registered.total() + self.corporate.total()
    }
}

/// Go-go / slow-go / no-go spending in start-year dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingProfile {
    pub go_go: f64,
    /// Last age (person 1) of the go-go phase
    pub go_go_end_age: u32,
    pub slow_go: f64,
    pub slow_go_end_age: u32,
    pub no_go: f64,
}

impl SpendingProfile {
    pub fn flat(amount: f64) -> Self {
        Self {
            go_go: amount,
            go_go_end_age: u32::MAX,
            slow_go: amount,
            slow_go_end_age: u32::MAX,
            no_go: amount,
        }
    }

    /// Phase amount at person 1's age, in start-year dollars
    pub fn base_amount(&self, age: u32) -> f64 {
        if age <= self.go_go_end_age {
            self.go_go
        } else if age <= self.slow_go_end_age {
            self.slow_go
        } else {
            self.no_go
        }
    }
}

/// Income the OAS recovery tax is measured against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClawbackBasis {
    #[default]
    CurrentYear,
    PriorYear,
}

/// One or two retirees plus run settings
#[derive(Debug, Clone, PartialEq)]
pub struct Household {
    pub p1: Person,
    pub p2: Option<Person>,
    /// Province or territory code
    pub jurisdiction: String,
    pub start_year: i32,
    /// The run ends in the year the older person reaches this age
    pub end_age: u32,
    pub strategy: Strategy,
    pub spending: SpendingProfile,
    pub spending_inflation: f64,
    pub general_inflation: f64,
    /// Share of RRIF pension income that may move to the spouse (0 to 0.5)
    pub income_split_fraction: f64,
    pub gap_tolerance: f64,
    pub stop_on_fail: bool,
    /// Non-registered distributions are reinvested instead of paid out
    pub reinvest_distributions: bool,
    pub clawback_basis: ClawbackBasis,
}

impl Household {
    /// Single-person household with neutral settings
    pub fn single(person: Person, start_year: i32, end_age: u32) -> Self {
        Self {
            p1: person,
            p2: None,
            jurisdiction: "ON".to_string(),
            start_year,
            end_age,
            strategy: Strategy::default(),
            spending: SpendingProfile::flat(0.0),
            spending_inflation: 0.0,
            general_inflation: 0.0,
            income_split_fraction: 0.0,
            gap_tolerance: 0.0,
            stop_on_fail: false,
            reinvest_distributions: false,
            clawback_basis: ClawbackBasis::CurrentYear,
        }
    }

    pub fn couple(p1: Person, p2: Person, start_year: i32, end_age: u32) -> Self {
        Self {
            p2: Some(p2),
            ..Self::single(p1, start_year, end_age)
        }
    }

    pub fn persons(&self) -> Vec<&Person> {
        std::iter::once(&self.p1).chain(self.p2.as_ref()).collect()
    }

    pub fn is_couple(&self) -> bool {
        self.p2.is_some()
    }

    pub fn oldest_age(&self) -> u32 {
        self.persons().iter().map(|p| p.age).max().unwrap_or(self.p1.age)
    }

    /// Number of years from the start year to the year the older person
    /// reaches `end_age`, inclusive
    pub fn years_to_simulate(&self) -> u32 {
        self.end_age.saturating_sub(self.oldest_age()) + 1
    }

    /// After-tax spending target for a year, inflated from the start year
    pub fn spending_target(&self, year: i32) -> f64 {
        let elapsed = (year - self.start_year).max(0);
        let age = self.p1.age + elapsed as u32;
        self.spending.base_amount(age) * (1.0 + self.spending_inflation).powi(elapsed)
    }
}
