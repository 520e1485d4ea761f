//! Invariant checks on emitted year records

use super::records::YearRecord;
use crate::assumptions::JurisdictionParams;
use crate::error::InvariantViolation;

/// Slack for floating-point comparisons
const EPSILON: f64 = 1e-6;

/// Check one record against the rules every year must satisfy
pub fn check_year(
    record: &YearRecord,
    previous: Option<&YearRecord>,
    params: &JurisdictionParams,
    tolerance: f64,
) -> Vec<InvariantViolation> {
    let year = record.year;
    let mut violations = Vec::new();

    for (person, p) in record.people.iter().enumerate() {
        let balances = &p.end_balances;
        for (account, value) in [
            ("tfsa", balances.tfsa),
            ("rrif", balances.rrif),
            ("non_registered", balances.non_registered),
            ("corporate", balances.corporate),
        ] {
            if value < -EPSILON {
                violations.push(InvariantViolation::NegativeBalance {
                    year,
                    person,
                    account,
                    value,
                });
            }
        }

        if balances.non_registered_acb < -EPSILON
            || balances.non_registered_acb > balances.non_registered + EPSILON
        {
            violations.push(InvariantViolation::AcbOutOfRange {
                year,
                person,
                acb: balances.non_registered_acb,
                market_value: balances.non_registered,
            });
        }

        if p.net_tax < 0.0 {
            violations.push(InvariantViolation::NegativeTax {
                year,
                person,
                value: p.net_tax,
            });
        }

        if p.oas_clawback > p.oas_gross + EPSILON {
            violations.push(InvariantViolation::ClawbackExceedsOas {
                year,
                person,
                clawback: p.oas_clawback,
                oas: p.oas_gross,
            });
        }

        let expected = p.income.taxable_income(params).max(0.0);
        if (p.taxable_income - expected).abs() > EPSILON * expected.abs().max(1.0) {
            violations.push(InvariantViolation::TaxableIncomeMismatch {
                year,
                person,
                recorded: p.taxable_income,
                expected,
            });
        }

        if p.rrif_withdrawal < p.rrif_minimum - EPSILON {
            violations.push(InvariantViolation::RrifMinimumMissed {
                year,
                person,
                withdrawn: p.rrif_withdrawal,
                minimum: p.rrif_minimum,
            });
        }
    }

    if record.funded && record.after_tax_cash < record.spending_target - tolerance - EPSILON {
        violations.push(InvariantViolation::FundedBelowTarget {
            year,
            cash: record.after_tax_cash,
            target: record.spending_target,
        });
    }

    if let Some(previous) = previous {
        for (series, before, after) in [
            ("cumulative_tax", previous.cumulative_tax, record.cumulative_tax),
            ("cumulative_spending", previous.cumulative_spending, record.cumulative_spending),
        ] {
            if after < before - EPSILON {
                violations.push(InvariantViolation::CumulativeDecrease {
                    year,
                    series,
                    previous: before,
                    current: after,
                });
            }
        }
    }

    violations
}

/// Check every record of a run
pub fn check_run(records: &[YearRecord], params: &JurisdictionParams, tolerance: f64) -> Vec<InvariantViolation> {
    records
        .iter()
        .enumerate()
        .flat_map(|(i, record)| {
            let previous = i.checked_sub(1).map(|j| &records[j]);
            check_year(record, previous, params, tolerance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ontario_params_2025;
    use crate::income::IncomeCategories;
    use crate::projection::records::{Balances, PersonYear};
    use crate::projection::CorporateYear;

    fn person_year() -> PersonYear {
        PersonYear {
            name: "A".to_string(),
            age: 72,
            cpp: 0.0,
            oas_gross: 8_000.0,
            oas_clawback: 0.0,
            gis: 0.0,
            pension_income: 0.0,
            employment_income: 0.0,
            other_income: 0.0,
            distributions: 0.0,
            income: IncomeCategories {
                ordinary: 8_000.0,
                pension_eligible: 26_400.0,
                ..Default::default()
            },
            rrif_minimum: 26_400.0,
            rrif_withdrawal: 26_400.0,
            tfsa_withdrawal: 0.0,
            non_registered_withdrawal: 0.0,
            corporate_withdrawal: 0.0,
            tfsa_contribution: 0.0,
            non_registered_contribution: 0.0,
            realized_gain: 0.0,
            taxable_income: 34_400.0,
            federal_tax: 0.0,
            provincial_tax: 0.0,
            net_tax: 0.0,
            marginal_rate: 0.2,
            split_transferred: 0.0,
            split_received: 0.0,
            corporate: CorporateYear::default(),
            end_balances: Balances {
                rrif: 473_600.0,
                ..Default::default()
            },
        }
    }

    fn record(year: i32, cumulative_tax: f64) -> YearRecord {
        YearRecord {
            year,
            people: vec![person_year()],
            spending_target: 30_000.0,
            inflows: 34_400.0,
            withdrawals: 26_400.0,
            after_tax_cash: 34_400.0,
            spending_met: 30_000.0,
            underfunded: 0.0,
            funded: true,
            surplus: 4_400.0,
            iterations: 1,
            convergence: None,
            tax: 0.0,
            oas_clawback: 0.0,
            cumulative_tax,
            cumulative_spending: 30_000.0,
            net_worth: 473_600.0,
            estate: None,
        }
    }

    #[test]
    fn test_clean_record_passes() {
        let params = ontario_params_2025();
        assert!(check_year(&record(2025, 0.0), None, &params, 0.0).is_empty());
    }

    #[test]
    fn test_detects_violations() {
        let params = ontario_params_2025();
        let mut bad = record(2026, 0.0);
        bad.people[0].end_balances.tfsa = -5.0;
        bad.people[0].oas_clawback = 9_000.0;
        bad.people[0].taxable_income = 40_000.0;
        bad.people[0].rrif_withdrawal = 10_000.0;
        bad.after_tax_cash = 10_000.0;

        let previous = record(2025, 100.0);
        let violations = check_year(&bad, Some(&previous), &params, 0.0);

        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::NegativeBalance { account: "tfsa", .. })));
        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::ClawbackExceedsOas { .. })));
        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::TaxableIncomeMismatch { .. })));
        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::RrifMinimumMissed { .. })));
        assert!(violations.iter().any(|v| matches!(v, InvariantViolation::FundedBelowTarget { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, InvariantViolation::CumulativeDecrease { series: "cumulative_tax", .. })));
    }
}
