//! Personal income tax: progressive brackets, non-refundable credits and the
//! OAS recovery tax
//!
//! The engine is a pure function of its inputs; the resolver calls it inside
//! its fixed-point loop.

mod engine;

pub use engine::{assess, oas_clawback};

use serde::{Deserialize, Serialize};

use crate::income::IncomeCategories;

/// Everything the engine needs for one person
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxInput {
    pub age: u32,
    pub income: IncomeCategories,
    pub oas_gross: f64,
    /// Income the clawback is measured against; current taxable income when `None`
    pub clawback_income: Option<f64>,
}

/// Itemised non-refundable credits for one level of government
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub basic_personal: f64,
    pub age: f64,
    pub pension: f64,
    pub eligible_dividend: f64,
    pub non_eligible_dividend: f64,
}

impl Credits {
    pub fn total(&self) -> f64 {
        self.basic_personal + self.age + self.pension + self.eligible_dividend + self.non_eligible_dividend
    }
}

/// Result for one level (federal or provincial)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTax {
    pub gross_tax: f64,
    pub credits: Credits,
    /// Credits actually used, bounded by gross tax
    pub applied_credits: f64,
    pub net_tax: f64,
    /// Bracket rate on the next dollar of taxable income
    pub bracket_rate: f64,
}

/// Combined marginal rates on the next dollar of each income type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginalRates {
    pub ordinary: f64,
    /// Per dollar of actual dividend, net of the dividend credit
    pub eligible_dividend: f64,
    pub non_eligible_dividend: f64,
    pub capital_gain: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub taxable_income: f64,
    pub federal: LevelTax,
    pub provincial: LevelTax,
    /// Federal + provincial net tax; excludes the OAS clawback
    pub net_tax: f64,
    pub oas_clawback: f64,
    /// Federal + provincial bracket rate at taxable income
    pub marginal_rate: f64,
    pub marginal: MarginalRates,
}

impl TaxAssessment {
    /// Net tax plus clawback: the cash the person loses to the government
    pub fn total_cost(&self) -> f64 {
        self.net_tax + self.oas_clawback
    }
}
