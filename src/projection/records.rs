//! Year records, run summary and CSV output

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::estate::EstateRecord;
use super::evolution::CorporateYear;
use crate::error::ConvergenceWarning;
use crate::income::IncomeCategories;
use crate::withdrawal::Strategy;

/// End-of-year balances for one person
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub tfsa: f64,
    pub tfsa_room: f64,
    pub rrif: f64,
    pub non_registered: f64,
    pub non_registered_acb: f64,
    pub corporate: f64,
    pub rdtoh: f64,
    pub cda: f64,
}

impl Balances {
    pub fn total(&self) -> f64 {
        self.tfsa + self.rrif + self.non_registered + self.corporate
    }
}

/// One person's year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonYear {
    pub name: String,
    pub age: u32,

    // Benefits and recurring income
    pub cpp: f64,
    pub oas_gross: f64,
    pub oas_clawback: f64,
    pub gis: f64,
    pub pension_income: f64,
    pub employment_income: f64,
    pub other_income: f64,
    /// Fund distributions earned on non-registered holdings
    pub distributions: f64,

    /// Final income by category, after any pension split
    pub income: IncomeCategories,

    // Withdrawals
    pub rrif_minimum: f64,
    /// Total registered withdrawal, mandatory draw included
    pub rrif_withdrawal: f64,
    pub tfsa_withdrawal: f64,
    pub non_registered_withdrawal: f64,
    pub corporate_withdrawal: f64,

    // Contributions
    pub tfsa_contribution: f64,
    pub non_registered_contribution: f64,

    /// Gains realised on non-registered sales and distributions
    pub realized_gain: f64,

    // Tax
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub provincial_tax: f64,
    pub net_tax: f64,
    pub marginal_rate: f64,

    pub split_transferred: f64,
    pub split_received: f64,

    pub corporate: CorporateYear,
    pub end_balances: Balances,
}

impl PersonYear {
    pub fn withdrawals(&self) -> f64 {
        self.rrif_withdrawal + self.tfsa_withdrawal + self.non_registered_withdrawal + self.corporate_withdrawal
    }
}

/// Household year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub people: Vec<PersonYear>,

    pub spending_target: f64,
    /// Gross recurring cash before discretionary draws and tax
    pub inflows: f64,
    pub withdrawals: f64,
    pub after_tax_cash: f64,
    pub spending_met: f64,
    pub underfunded: f64,
    pub funded: bool,
    pub surplus: f64,

    pub iterations: u32,
    pub convergence: Option<ConvergenceWarning>,

    /// Net federal + provincial tax for the household
    pub tax: f64,
    pub oas_clawback: f64,
    pub cumulative_tax: f64,
    pub cumulative_spending: f64,
    pub net_worth: f64,

    /// Terminal year only
    pub estate: Option<EstateRecord>,
}

impl YearRecord {
    pub fn taxable_income(&self) -> f64 {
        self.people.iter().map(|p| p.taxable_income).sum()
    }

    pub fn average_marginal_rate(&self) -> f64 {
        if self.people.is_empty() {
            return 0.0;
        }
        self.people.iter().map(|p| p.marginal_rate).sum::<f64>() / self.people.len() as f64
    }
}

/// Aggregate metrics for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub years_simulated: u32,
    pub years_funded: u32,
    pub success_rate: f64,
    pub total_inflows: f64,
    pub total_withdrawals: f64,
    /// Lifetime net tax, excluding tax at death
    pub total_tax: f64,
    pub total_oas_clawback: f64,
    pub total_spending: f64,
    pub final_gross_estate: f64,
    pub final_after_tax_estate: f64,
    /// Lifetime tax over lifetime taxable income
    pub average_effective_rate: f64,
    /// Mean of each year's average marginal rate across persons
    pub average_marginal_rate: f64,
    pub first_failure_year: Option<i32>,
    pub underfunded_years: u32,
    pub total_underfunding: f64,
}

impl Summary {
    pub fn from_records(records: &[YearRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let years_simulated = records.len() as u32;
        let years_funded = records.iter().filter(|r| r.funded).count() as u32;
        let total_tax: f64 = records.iter().map(|r| r.tax).sum();
        let total_taxable: f64 = records.iter().map(YearRecord::taxable_income).sum();

        let (final_gross_estate, final_after_tax_estate) = match records.last() {
            Some(YearRecord {
                estate: Some(estate), ..
            }) => (estate.gross_estate, estate.after_tax_legacy),
            Some(last) => (last.net_worth, last.net_worth),
            None => (0.0, 0.0),
        };

        Self {
            years_simulated,
            years_funded,
            success_rate: years_funded as f64 / years_simulated as f64,
            total_inflows: records.iter().map(|r| r.inflows).sum(),
            total_withdrawals: records.iter().map(|r| r.withdrawals).sum(),
            total_tax,
            total_oas_clawback: records.iter().map(|r| r.oas_clawback).sum(),
            total_spending: records.iter().map(|r| r.spending_met).sum(),
            final_gross_estate,
            final_after_tax_estate,
            average_effective_rate: if total_taxable > 0.0 {
                total_tax / total_taxable
            } else {
                0.0
            },
            average_marginal_rate: records.iter().map(YearRecord::average_marginal_rate).sum::<f64>()
                / years_simulated as f64,
            first_failure_year: records.iter().find(|r| !r.funded).map(|r| r.year),
            underfunded_years: years_simulated - years_funded,
            total_underfunding: records.iter().map(|r| r.underfunded).sum(),
        }
    }
}

/// Complete simulation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy: Strategy,
    pub records: Vec<YearRecord>,
    pub summary: Summary,
}

impl SimulationResult {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            records: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub fn add_record(&mut self, record: YearRecord) {
        self.records.push(record);
    }

    /// Recompute the summary from the records
    pub fn finalize(&mut self) {
        self.summary = Summary::from_records(&self.records);
    }
}

const PERSON_COLUMNS: [&str; 21] = [
    "age",
    "cpp",
    "oas",
    "oas_clawback",
    "gis",
    "pension",
    "other_income",
    "rrif_minimum",
    "rrif_withdrawal",
    "tfsa_withdrawal",
    "nonreg_withdrawal",
    "corp_withdrawal",
    "tfsa_contribution",
    "nonreg_contribution",
    "taxable_income",
    "net_tax",
    "marginal_rate",
    "end_tfsa",
    "end_rrif",
    "end_nonreg",
    "end_corp",
];

fn person_fields(person: Option<&PersonYear>) -> Vec<String> {
    match person {
        Some(p) => {
            let values = [
                p.cpp,
                p.oas_gross,
                p.oas_clawback,
                p.gis,
                p.pension_income,
                p.employment_income + p.other_income,
                p.rrif_minimum,
                p.rrif_withdrawal,
                p.tfsa_withdrawal,
                p.non_registered_withdrawal,
                p.corporate_withdrawal,
                p.tfsa_contribution,
                p.non_registered_contribution,
                p.taxable_income,
                p.net_tax,
                p.marginal_rate,
                p.end_balances.tfsa,
                p.end_balances.rrif,
                p.end_balances.non_registered,
                p.end_balances.corporate,
            ];
            std::iter::once(p.age.to_string())
                .chain(values.iter().map(|v| format!("{v:.2}")))
                .collect()
        }
        None => vec![String::new(); PERSON_COLUMNS.len()],
    }
}

/// Flatten year records to CSV, one row per year with p1_/p2_ columns
pub fn write_csv<W: Write>(records: &[YearRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["year".to_string()];
    for prefix in ["p1", "p2"] {
        header.extend(PERSON_COLUMNS.iter().map(|c| format!("{prefix}_{c}")));
    }
    header.extend(
        [
            "spending_target",
            "after_tax_cash",
            "spending_met",
            "underfunded",
            "funded",
            "surplus",
            "iterations",
            "tax",
            "cumulative_tax",
            "net_worth",
            "after_tax_legacy",
        ]
        .map(String::from),
    );
    csv.write_record(&header)?;

    for record in records {
        let mut row = vec![record.year.to_string()];
        row.extend(person_fields(record.people.first()));
        row.extend(person_fields(record.people.get(1)));
        row.extend([
            format!("{:.2}", record.spending_target),
            format!("{:.2}", record.after_tax_cash),
            format!("{:.2}", record.spending_met),
            format!("{:.2}", record.underfunded),
            record.funded.to_string(),
            format!("{:.2}", record.surplus),
            record.iterations.to_string(),
            format!("{:.2}", record.tax),
            format!("{:.2}", record.cumulative_tax),
            format!("{:.2}", record.net_worth),
            record
                .estate
                .as_ref()
                .map(|e| format!("{:.2}", e.after_tax_legacy))
                .unwrap_or_default(),
        ]);
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, funded: bool, tax: f64) -> YearRecord {
        YearRecord {
            year,
            people: Vec::new(),
            spending_target: 50_000.0,
            inflows: 30_000.0,
            withdrawals: 25_000.0,
            after_tax_cash: if funded { 50_000.0 } else { 40_000.0 },
            spending_met: if funded { 50_000.0 } else { 40_000.0 },
            underfunded: if funded { 0.0 } else { 10_000.0 },
            funded,
            surplus: 0.0,
            iterations: 1,
            convergence: None,
            tax,
            oas_clawback: 0.0,
            cumulative_tax: 0.0,
            cumulative_spending: 0.0,
            net_worth: 400_000.0,
            estate: None,
        }
    }

    #[test]
    fn test_summary_counts_failures() {
        let records = vec![record(2025, true, 5_000.0), record(2026, false, 4_000.0), record(2027, false, 3_000.0)];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.years_simulated, 3);
        assert_eq!(summary.years_funded, 1);
        assert!((summary.success_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.first_failure_year, Some(2026));
        assert_eq!(summary.underfunded_years, 2);
        assert_eq!(summary.total_underfunding, 20_000.0);
        assert_eq!(summary.total_tax, 12_000.0);
        assert_eq!(summary.final_gross_estate, 400_000.0);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(Summary::from_records(&[]), Summary::default());
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let records = vec![record(2025, true, 5_000.0)];
        let mut buffer = Vec::new();
        write_csv(&records, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("year,p1_age,p1_cpp"));
        assert!(header.ends_with("after_tax_legacy"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("2025,"));
        assert_eq!(row.split(',').count(), header.split(',').count());
    }
}
