//! Tax-year parameters for one jurisdiction (federal + provincial pair)

use serde::{Deserialize, Serialize};

use super::rrif::RrifMinimumTable;
use crate::error::ConfigError;

/// One progressive bracket. `upper = None` marks the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub upper: Option<f64>,
    pub rate: f64,
}

impl Bracket {
    pub fn new(upper: f64, rate: f64) -> Self {
        Self {
            upper: Some(upper),
            rate,
        }
    }

    pub fn top(rate: f64) -> Self {
        Self { upper: None, rate }
    }
}

/// Rates and credits for one level of government
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxParams {
    /// Ordered brackets, lowest first
    pub brackets: Vec<Bracket>,

    pub basic_personal_amount: f64,
    pub basic_personal_rate: f64,

    /// Age amount available from 65
    pub age_amount: f64,
    pub age_amount_rate: f64,
    /// Income above which the age amount is reduced
    pub age_amount_threshold: f64,
    /// Reduction per dollar above the threshold
    pub age_amount_taper: f64,

    pub pension_credit_cap: f64,
    pub pension_credit_rate: f64,

    /// Credit rates are applied to the grossed-up dividend
    pub eligible_dividend_credit_rate: f64,
    pub non_eligible_dividend_credit_rate: f64,
}

impl TaxParams {
    /// Progressive tax on `taxable` integrated across the brackets
    pub fn gross_tax(&self, taxable: f64) -> f64 {
        if taxable <= 0.0 {
            return 0.0;
        }

        let mut tax = 0.0;
        let mut lower = 0.0;
        for bracket in &self.brackets {
            let upper = bracket.upper.unwrap_or(f64::INFINITY);
            if taxable <= lower {
                break;
            }
            tax += (taxable.min(upper) - lower) * bracket.rate;
            lower = upper;
        }
        tax
    }

    /// Rate applied to the next dollar of taxable income
    pub fn bracket_rate(&self, taxable: f64) -> f64 {
        self.brackets
            .iter()
            .find(|b| b.upper.map_or(true, |upper| taxable.max(0.0) < upper))
            .or(self.brackets.last())
            .map(|b| b.rate)
            .unwrap_or(0.0)
    }

    /// Lowest bracket threshold strictly above `taxable`
    pub fn next_threshold_above(&self, taxable: f64) -> Option<f64> {
        self.brackets
            .iter()
            .filter_map(|b| b.upper)
            .find(|&upper| upper > taxable)
    }

    fn validate(&self, context: &str) -> Result<(), ConfigError> {
        if self.brackets.is_empty() {
            return Err(ConfigError::MalformedBracket {
                context: context.to_string(),
                reason: "no brackets".to_string(),
            });
        }

        let last = self.brackets.len() - 1;
        let mut previous = 0.0;
        for (i, bracket) in self.brackets.iter().enumerate() {
            check_rate(&format!("{context}.brackets[{i}].rate"), bracket.rate)?;
            match bracket.upper {
                None if i != last => {
                    return Err(ConfigError::MalformedBracket {
                        context: context.to_string(),
                        reason: format!("bracket {i} is open-ended but not last"),
                    });
                }
                Some(_) if i == last => {
                    return Err(ConfigError::MalformedBracket {
                        context: context.to_string(),
                        reason: "top bracket must be open-ended".to_string(),
                    });
                }
                Some(upper) if upper <= previous => {
                    return Err(ConfigError::MalformedBracket {
                        context: context.to_string(),
                        reason: format!("threshold {upper} is not above {previous}"),
                    });
                }
                Some(upper) => previous = upper,
                None => {}
            }
        }

        for (field, value) in [
            ("basic_personal_rate", self.basic_personal_rate),
            ("age_amount_rate", self.age_amount_rate),
            ("age_amount_taper", self.age_amount_taper),
            ("pension_credit_rate", self.pension_credit_rate),
            ("eligible_dividend_credit_rate", self.eligible_dividend_credit_rate),
            ("non_eligible_dividend_credit_rate", self.non_eligible_dividend_credit_rate),
        ] {
            check_rate(&format!("{context}.{field}"), value)?;
        }
        Ok(())
    }
}

/// Gross-up factors shared by both levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendGrossUp {
    pub eligible: f64,
    pub non_eligible: f64,
}

/// Old Age Security recovery tax and age top-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OasParams {
    pub clawback_threshold: f64,
    pub clawback_rate: f64,
    /// Permanent increase once the recipient is 75
    #[serde(default)]
    pub age_75_increase: f64,
}

/// Maximum annual GIS and the income at which it reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GisSchedule {
    pub max_benefit: f64,
    pub income_threshold: f64,
}

/// Guaranteed Income Supplement configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GisParams {
    pub single: GisSchedule,
    pub couple: GisSchedule,
    /// Benefit reduction per counted dollar
    pub taper: f64,
    /// Employment income ignored entirely
    pub employment_exemption: f64,
    /// Band above the exemption that is only partly counted
    pub partial_exemption_band: f64,
    /// Fraction of the band that is exempt
    pub partial_exemption_rate: f64,
}

/// TFSA room convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfsaParams {
    pub annual_room: f64,
    /// Withdrawals are added back to room the following year
    #[serde(default = "default_true")]
    pub restore_withdrawals: bool,
}

fn default_true() -> bool {
    true
}

fn default_conversion_age() -> u32 {
    71
}

/// Immutable federal + provincial parameters for one (jurisdiction, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionParams {
    /// Province/territory code, e.g. "ON"
    pub jurisdiction: String,
    pub year: i32,

    pub federal: TaxParams,
    pub provincial: TaxParams,

    pub dividend_gross_up: DividendGrossUp,
    pub oas: OasParams,
    pub gis: GisParams,
    pub capital_gains_inclusion: f64,
    pub tfsa: TfsaParams,

    /// RRSP must be converted (and minimums start) at this age
    #[serde(default = "default_conversion_age")]
    pub rrif_conversion_age: u32,

    #[serde(default)]
    pub rrif_minimums: RrifMinimumTable,
}

impl JurisdictionParams {
    /// Next federal or provincial threshold above `taxable`, whichever is lower
    pub fn next_bracket_threshold(&self, taxable: f64) -> Option<f64> {
        match (
            self.federal.next_threshold_above(taxable),
            self.provincial.next_threshold_above(taxable),
        ) {
            (Some(f), Some(p)) => Some(f.min(p)),
            (f, p) => f.or(p),
        }
    }

    /// Check brackets and rates; called on every parameter set the index accepts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let context = format!("{}/{}", self.jurisdiction, self.year);
        self.federal.validate(&format!("{context} federal"))?;
        self.provincial.validate(&format!("{context} provincial"))?;

        for (field, value) in [
            ("capital_gains_inclusion", self.capital_gains_inclusion),
            ("oas.clawback_rate", self.oas.clawback_rate),
            ("oas.age_75_increase", self.oas.age_75_increase),
            ("gis.taper", self.gis.taper),
            ("gis.partial_exemption_rate", self.gis.partial_exemption_rate),
            ("dividend_gross_up.eligible", self.dividend_gross_up.eligible),
            ("dividend_gross_up.non_eligible", self.dividend_gross_up.non_eligible),
        ] {
            check_rate(&format!("{context} {field}"), value)?;
        }
        self.rrif_minimums.validate()?;
        Ok(())
    }
}

pub(crate) fn check_rate(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}
