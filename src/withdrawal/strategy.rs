//! Withdrawal strategies and their per-person draw order

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::household::SaleOrder;

/// Account classes a discretionary draw can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountClass {
    Tfsa,
    NonRegistered,
    Corporate,
    Rrif,
}

impl AccountClass {
    /// Draws that can raise taxable income
    pub fn is_taxable(&self) -> bool {
        !matches!(self, AccountClass::Tfsa)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountClass::Tfsa => "tfsa",
            AccountClass::NonRegistered => "non_registered",
            AccountClass::Corporate => "corporate",
            AccountClass::Rrif => "rrif",
        }
    }
}

/// Income level a guarded strategy tries not to cross before using the TFSA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeThreshold {
    /// Next federal or provincial bracket threshold above base income
    NextBracket,
    OasClawback,
}

pub const DEFAULT_FRONTLOAD_PRE_OAS: f64 = 0.10;
pub const DEFAULT_FRONTLOAD_POST_OAS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum StrategyKind {
    MinimizeIncome,
    /// Estate-preserving: TFSA drawn last
    Balanced,
    TfsaFirst,
    CorporateOptimized,
    /// Planned RRIF draw each year as a fraction of the balance
    RrifFrontload {
        pre_oas_fraction: f64,
        post_oas_fraction: f64,
    },
    /// Sells the highest-gain non-registered bucket first
    CapitalGainsOptimized,
}

/// Strategy plus an optional TFSA guard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    #[serde(default)]
    pub tfsa_guard: Option<IncomeThreshold>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyKind::MinimizeIncome)
    }
}

/// One (person, class) entry in the expanded draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawStep {
    pub person: usize,
    pub class: AccountClass,
    /// Draw only up to this income threshold
    pub capped: Option<IncomeThreshold>,
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            tfsa_guard: None,
        }
    }

    pub fn guarded(kind: StrategyKind, guard: IncomeThreshold) -> Self {
        Self {
            kind,
            tfsa_guard: Some(guard),
        }
    }

    pub fn rrif_frontload() -> Self {
        Self::new(StrategyKind::RrifFrontload {
            pre_oas_fraction: DEFAULT_FRONTLOAD_PRE_OAS,
            post_oas_fraction: DEFAULT_FRONTLOAD_POST_OAS,
        })
    }

    /// Class order for each person
    pub fn priority(&self) -> [AccountClass; 4] {
        use AccountClass::*;
        match self.kind {
            StrategyKind::MinimizeIncome | StrategyKind::TfsaFirst => {
                [Tfsa, NonRegistered, Corporate, Rrif]
            }
            StrategyKind::Balanced => [NonRegistered, Corporate, Rrif, Tfsa],
            StrategyKind::CorporateOptimized => [Corporate, Rrif, NonRegistered, Tfsa],
            StrategyKind::RrifFrontload { .. } => [NonRegistered, Corporate, Tfsa, Rrif],
            StrategyKind::CapitalGainsOptimized => [NonRegistered, Corporate, Rrif, Tfsa],
        }
    }

    pub fn sale_order(&self) -> SaleOrder {
        match self.kind {
            StrategyKind::CapitalGainsOptimized => SaleOrder::HighestGainFirst,
            _ => SaleOrder::Proportional,
        }
    }

    /// Planned registered draw for RRIF-frontload; zero for other strategies
    pub fn frontload_target(&self, age: u32, oas_start_age: u32, balance: f64) -> f64 {
        match self.kind {
            StrategyKind::RrifFrontload {
                pre_oas_fraction,
                post_oas_fraction,
            } => {
                let fraction = if age < oas_start_age {
                    pre_oas_fraction
                } else {
                    post_oas_fraction
                };
                fraction * balance.max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Expand the class order into per-person steps
    ///
    /// `persons` is ordered lowest base taxable income first. With a guard,
    /// taxable classes are drawn up to the threshold, then the TFSA, then the
    /// taxable classes again without a cap.
    pub fn expand(&self, persons: &[usize]) -> Vec<DrawStep> {
        let priority = self.priority();
        let mut steps = Vec::with_capacity(priority.len() * persons.len() * 2);
        let mut push = |class: AccountClass, capped: Option<IncomeThreshold>| {
            for &person in persons {
                steps.push(DrawStep {
                    person,
                    class,
                    capped,
                });
            }
        };

        match self.tfsa_guard {
            None => {
                for class in priority {
                    push(class, None);
                }
            }
            Some(guard) => {
                for class in priority.into_iter().filter(AccountClass::is_taxable) {
                    push(class, Some(guard));
                }
                push(AccountClass::Tfsa, None);
                for class in priority.into_iter().filter(AccountClass::is_taxable) {
                    push(class, None);
                }
            }
        }
        steps
    }

    /// Offending field and value when a fraction is not a decimal rate
    pub(crate) fn validate(&self) -> Result<(), (&'static str, f64)> {
        if let StrategyKind::RrifFrontload {
            pre_oas_fraction,
            post_oas_fraction,
        } = self.kind
        {
            if !(0.0..=1.0).contains(&pre_oas_fraction) {
                return Err(("strategy.pre_oas_fraction", pre_oas_fraction));
            }
            if !(0.0..=1.0).contains(&post_oas_fraction) {
                return Err(("strategy.post_oas_fraction", post_oas_fraction));
            }
        }
        Ok(())
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::MinimizeIncome => "minimize-income",
            StrategyKind::Balanced => "balanced",
            StrategyKind::TfsaFirst => "tfsa-first",
            StrategyKind::CorporateOptimized => "corporate-optimized",
            StrategyKind::RrifFrontload { .. } => "rrif-frontload",
            StrategyKind::CapitalGainsOptimized => "capital-gains-optimized",
        };
        f.write_str(name)
    }
}

impl fmt::Display for IncomeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncomeThreshold::NextBracket => f.write_str("next-bracket"),
            IncomeThreshold::OasClawback => f.write_str("oas-clawback"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tfsa_guard {
            Some(guard) => write!(f, "{}+{}", self.kind, guard),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    /// Accepts canonical names, British spellings, underscores, the legacy
    /// `tfsa-partial` / `tfsa-moderate` tags and `kind+guard` pairs
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['_', ' '], "-")
            .replace("minimise", "minimize")
            .replace("optimised", "optimized");

        let (kind_name, guard_name) = match normalized.split_once('+') {
            Some((kind, guard)) => (kind, Some(guard)),
            None => (normalized.as_str(), None),
        };

        let mut strategy = match kind_name {
            "minimize-income" | "min-income" => Strategy::new(StrategyKind::MinimizeIncome),
            "balanced" | "estate-preserving" => Strategy::new(StrategyKind::Balanced),
            "tfsa-first" => Strategy::new(StrategyKind::TfsaFirst),
            "corporate-optimized" | "corp-optimized" => {
                Strategy::new(StrategyKind::CorporateOptimized)
            }
            "rrif-frontload" | "rrif-front-load" => Strategy::rrif_frontload(),
            "capital-gains-optimized" | "cg-optimized" => {
                Strategy::new(StrategyKind::CapitalGainsOptimized)
            }
            "tfsa-partial" => Strategy::guarded(StrategyKind::TfsaFirst, IncomeThreshold::NextBracket),
            "tfsa-moderate" => Strategy::guarded(StrategyKind::TfsaFirst, IncomeThreshold::OasClawback),
            _ => return Err(ConfigError::UnknownStrategy(s.to_string())),
        };

        if let Some(guard) = guard_name {
            strategy.tfsa_guard = Some(match guard {
                "next-bracket" | "partial" => IncomeThreshold::NextBracket,
                "oas-clawback" | "moderate" => IncomeThreshold::OasClawback,
                _ => return Err(ConfigError::UnknownStrategy(s.to_string())),
            });
        }
        Ok(strategy)
    }
}
