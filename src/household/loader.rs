//! Load a household from JSON
//!
//! Sub-bucket balances may be given explicitly or as a total plus allocation
//! percentages; strategies are given by name.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::accounts::{
    Allocation, BucketedAccount, CorporateAccount, EarlyRrif, RegisteredAccount, TfsaAccount,
    YieldMix,
};
use super::data::{BenefitElection, ClawbackBasis, Household, OtherIncome, Pension, Person, SpendingProfile};
use crate::error::ConfigError;
use crate::withdrawal::Strategy;

/// Per-bucket yields for allocated accounts
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BucketYields {
    cash: YieldMix,
    gic: YieldMix,
    invested: YieldMix,
}

/// Either explicit buckets or a total split by allocation
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountInput {
    Allocated {
        total: f64,
        #[serde(default)]
        acb: Option<f64>,
        allocation: Allocation,
        #[serde(default)]
        yields: BucketYields,
    },
    Buckets(BucketedAccount),
}

impl Default for AccountInput {
    fn default() -> Self {
        AccountInput::Buckets(BucketedAccount::default())
    }
}

impl AccountInput {
    fn into_account(self, label: &str) -> Result<BucketedAccount, ConfigError> {
        match self {
            AccountInput::Buckets(account) => Ok(account),
            AccountInput::Allocated {
                total,
                acb,
                allocation,
                yields,
            } => BucketedAccount::from_allocation(
                label,
                total,
                acb,
                allocation,
                [yields.cash, yields.gic, yields.invested],
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorporateInput {
    #[serde(default)]
    holdings: AccountInput,
    #[serde(flatten)]
    settings: CorporateAccount,
}

#[derive(Debug, Deserialize)]
struct PersonInput {
    name: String,
    age: u32,
    cpp: BenefitElection,
    oas: BenefitElection,
    #[serde(default)]
    tfsa: TfsaAccount,
    #[serde(default)]
    rrif: RegisteredAccount,
    #[serde(default)]
    non_registered: AccountInput,
    #[serde(default)]
    corporate: Option<CorporateInput>,
    #[serde(default)]
    pensions: Vec<Pension>,
    #[serde(default)]
    other_income: Vec<OtherIncome>,
    #[serde(default)]
    early_rrif: Option<EarlyRrif>,
}

impl PersonInput {
    fn into_person(self) -> Result<Person, ConfigError> {
        let non_registered = self
            .non_registered
            .into_account(&format!("{} non-registered", self.name))?;
        let corporate = match self.corporate {
            Some(input) => CorporateAccount {
                buckets: input.holdings.into_account(&format!("{} corporate", self.name))?,
                ..input.settings
            },
            None => CorporateAccount::default(),
        };

        Ok(Person {
            name: self.name,
            age: self.age,
            cpp: self.cpp,
            oas: self.oas,
            tfsa: self.tfsa,
            rrif: self.rrif,
            non_registered,
            corporate,
            pensions: self.pensions,
            other_income: self.other_income,
            early_rrif: self.early_rrif,
        })
    }
}

fn default_jurisdiction() -> String {
    "ON".to_string()
}

fn default_strategy() -> String {
    "minimize-income".to_string()
}

/// Raw household file
#[derive(Debug, Deserialize)]
pub struct HouseholdFile {
    p1: PersonInput,
    #[serde(default)]
    p2: Option<PersonInput>,
    #[serde(default = "default_jurisdiction")]
    jurisdiction: String,
    /// Defaults to the current calendar year at the call site
    #[serde(default)]
    start_year: Option<i32>,
    end_age: u32,
    #[serde(default = "default_strategy")]
    strategy: String,
    spending: SpendingProfile,
    #[serde(default)]
    spending_inflation: f64,
    #[serde(default)]
    general_inflation: f64,
    #[serde(default)]
    income_split_fraction: f64,
    #[serde(default)]
    gap_tolerance: f64,
    #[serde(default)]
    stop_on_fail: bool,
    #[serde(default)]
    reinvest_distributions: bool,
    #[serde(default)]
    clawback_basis: ClawbackBasis,
}

impl HouseholdFile {
    pub fn start_year(&self) -> Option<i32> {
        self.start_year
    }

    /// Build the household; `default_start_year` applies when the file omits one
    pub fn into_household(self, default_start_year: i32) -> Result<Household, ConfigError> {
        let strategy: Strategy = self.strategy.parse()?;

        Ok(Household {
            p1: self.p1.into_person()?,
            p2: self.p2.map(PersonInput::into_person).transpose()?,
            jurisdiction: self.jurisdiction,
            start_year: self.start_year.unwrap_or(default_start_year),
            end_age: self.end_age,
            strategy,
            spending: self.spending,
            spending_inflation: self.spending_inflation,
            general_inflation: self.general_inflation,
            income_split_fraction: self.income_split_fraction,
            gap_tolerance: self.gap_tolerance,
            stop_on_fail: self.stop_on_fail,
            reinvest_distributions: self.reinvest_distributions,
            clawback_basis: self.clawback_basis,
        })
    }
}

/// Read a household JSON file
pub fn load_household(path: &Path, default_start_year: i32) -> Result<Household, ConfigError> {
    let file = File::open(path)?;
    let raw: HouseholdFile = serde_json::from_reader(BufReader::new(file))?;
    raw.into_household(default_start_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::withdrawal::{IncomeThreshold, StrategyKind};

    const HOUSEHOLD: &str = r#"{
        "p1": {
            "name": "Pat",
            "age": 66,
            "cpp": { "amount_at_65": 12000, "start_age": 65 },
            "oas": { "amount_at_65": 8800, "start_age": 65 },
            "tfsa": { "balance": 95000, "room": 7000, "yield_rate": 0.05 },
            "rrif": { "balance": 400000, "yield_rate": 0.05 },
            "non_registered": {
                "total": 200000,
                "acb": 150000,
                "allocation": { "cash": 0.1, "gic": 0.2, "invested": 0.7 },
                "yields": { "gic": { "interest": 0.04 }, "invested": { "eligible_dividend": 0.02, "growth": 0.04 } }
            },
            "corporate": {
                "holdings": { "cash": { "market_value": 50000, "acb": 50000 } },
                "rdtoh": 2000,
                "dividend_class": "non-eligible"
            }
        },
        "p2": {
            "name": "Sam",
            "age": 64,
            "cpp": { "amount_at_65": 9000, "start_age": 65 },
            "oas": { "amount_at_65": 8800, "start_age": 67 }
        },
        "end_age": 95,
        "strategy": "tfsa_partial",
        "spending": { "go_go": 70000, "go_go_end_age": 75, "slow_go": 60000, "slow_go_end_age": 85, "no_go": 50000 },
        "spending_inflation": 0.02,
        "gap_tolerance": 1000
    }"#;

    #[test]
    fn test_parse_household() {
        let raw: HouseholdFile = serde_json::from_str(HOUSEHOLD).unwrap();
        assert_eq!(raw.start_year(), None);

        let household = raw.into_household(2026).unwrap();
        assert_eq!(household.start_year, 2026);
        assert_eq!(household.jurisdiction, "ON");
        assert!(household.is_couple());
        assert_eq!(household.strategy.kind, StrategyKind::TfsaFirst);
        assert_eq!(household.strategy.tfsa_guard, Some(IncomeThreshold::NextBracket));

        let p1 = &household.p1;
        assert!((p1.non_registered.total() - 200_000.0).abs() < 1e-6);
        assert!((p1.non_registered.total_acb() - 150_000.0).abs() < 1e-6);
        assert!((p1.corporate.total() - 50_000.0).abs() < 1e-6);
        assert_eq!(p1.corporate.rdtoh, 2_000.0);
        assert_eq!(p1.corporate.rdtoh_refund_rate, 0.3833);
    }

    #[test]
    fn test_bad_allocation_is_config_error() {
        let bad = HOUSEHOLD.replace("\"invested\": 0.7", "\"invested\": 0.6");
        let raw: HouseholdFile = serde_json::from_str(&bad).unwrap();
        assert!(matches!(
            raw.into_household(2025),
            Err(ConfigError::AllocationMismatch { .. })
        ));
    }
}
