//! Pension income splitting between spouses
//!
//! A single trial: move the configured fraction of RRIF pension income from
//! the higher-marginal spouse to the other and keep the result only if the
//! household's net tax plus OAS clawback strictly drops.

use serde::{Deserialize, Serialize};

use crate::assumptions::JurisdictionParams;
use crate::tax::{assess, TaxAssessment, TaxInput};

/// Accepted reallocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub from: usize,
    pub to: usize,
    pub amount: f64,
    /// Reduction in net tax plus clawback
    pub saving: f64,
    pub inputs: [TaxInput; 2],
    pub assessments: [TaxAssessment; 2],
}

/// Trial the split; `rrif_pension` is each spouse's RRIF income that is
/// pension-eligible this year
pub fn trial_split(
    params: &JurisdictionParams,
    inputs: [TaxInput; 2],
    assessments: [TaxAssessment; 2],
    rrif_pension: [f64; 2],
    fraction: f64,
) -> Option<SplitOutcome> {
    if fraction <= 0.0 {
        return None;
    }

    let (from, to) = if (assessments[0].marginal_rate, assessments[0].taxable_income)
        >= (assessments[1].marginal_rate, assessments[1].taxable_income)
    {
        (0, 1)
    } else {
        (1, 0)
    };

    let amount = fraction.min(0.5) * rrif_pension[from].max(0.0);
    if amount <= 0.0 {
        return None;
    }

    let mut trial = inputs;
    trial[from].income.pension_eligible -= amount;
    trial[to].income.pension_eligible += amount;
    let trial_assessments = [assess(&trial[0], params), assess(&trial[1], params)];

    let before: f64 = assessments.iter().map(TaxAssessment::total_cost).sum();
    let after: f64 = trial_assessments.iter().map(TaxAssessment::total_cost).sum();

    if after < before {
        log::debug!("income split {from}->{to} of {amount:.2} saves {:.2}", before - after);
        Some(SplitOutcome {
            from,
            to,
            amount,
            saving: before - after,
            inputs: trial,
            assessments: trial_assessments,
        })
    } else {
        None
    }
}
