//! Retirement System CLI
//!
//! Runs a household file through one strategy, or compares every built-in
//! strategy side by side, and writes the year-by-year rows to CSV.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;

use retirement_system::assumptions::loader::load_rrif_factors;
use retirement_system::household::load_household;
use retirement_system::projection::write_csv;
use retirement_system::{ScenarioRunner, SimulationConfig, SimulationResult, Strategy, TaxTables};

#[derive(Parser, Debug)]
#[command(name = "retirement-system")]
#[command(about = "Year-by-year Canadian retirement cash-flow and tax simulator")]
struct Args {
    /// Household JSON file
    #[arg(long)]
    household: PathBuf,

    /// Tax parameter JSON (defaults to the built-in 2025 federal and Ontario tables)
    #[arg(long)]
    tax_params: Option<PathBuf>,

    /// RRIF minimum factors CSV with `age,factor` headers
    #[arg(long)]
    rrif_factors: Option<PathBuf>,

    /// Override the household's withdrawal strategy
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Run every built-in strategy and print a comparison
    #[arg(long)]
    compare: bool,

    /// CSV output path for the year-by-year rows
    #[arg(short, long, default_value = "simulation_output.csv")]
    output: PathBuf,

    /// Start year when the household file does not give one
    #[arg(long)]
    start_year: Option<i32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start_year = args.start_year.unwrap_or_else(|| chrono::Local::now().year());
    let mut household = load_household(&args.household, start_year)
        .with_context(|| format!("loading household from {}", args.household.display()))?;
    if let Some(strategy) = args.strategy {
        household.strategy = strategy;
    }

    let runner = match &args.tax_params {
        Some(path) => ScenarioRunner::from_paths(path, args.rrif_factors.as_deref())
            .with_context(|| format!("loading tax parameters from {}", path.display()))?,
        None => match &args.rrif_factors {
            Some(path) => {
                let factors = load_rrif_factors(path)
                    .with_context(|| format!("loading RRIF factors from {}", path.display()))?;
                let tables = TaxTables::default_2025().with_rrif_minimums(factors)?;
                ScenarioRunner::with_tables(tables, SimulationConfig::default())
            }
            None => ScenarioRunner::new(),
        },
    };

    println!("Retirement System v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!(
        "Household: {} ({}), {} to age {}",
        household.persons().iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(" & "),
        household.jurisdiction,
        household.start_year,
        household.end_age
    );

    if args.compare {
        let results = runner.compare_strategies(&household, &ScenarioRunner::all_strategies());
        print_comparison_header();
        for (strategy, result) in &results {
            match result {
                Ok(result) => print_comparison_row(result),
                Err(e) => println!("{:<32} failed: {}", strategy.to_string(), e),
            }
        }

        if let Some(best) = results
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .max_by(|a, b| {
                a.summary
                    .final_after_tax_estate
                    .total_cmp(&b.summary.final_after_tax_estate)
            })
        {
            println!("\nLargest after-tax estate: {}", best.strategy);
        }
    }

    let result = runner
        .run(&household)
        .with_context(|| format!("simulating with strategy {}", household.strategy))?;

    println!("\nStrategy: {}", result.strategy);
    println!(
        "{:>5} {:>12} {:>12} {:>12} {:>10} {:>14}",
        "Year", "Target", "After-tax", "Tax", "Funded", "Net worth"
    );
    println!("{}", "-".repeat(70));
    for record in &result.records {
        println!(
            "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>10} {:>14.2}",
            record.year,
            record.spending_target,
            record.after_tax_cash,
            record.tax,
            if record.funded { "yes" } else { "NO" },
            record.net_worth
        );
    }

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_csv(&result.records, file).context("writing CSV rows")?;
    println!("\nFull results written to: {}", args.output.display());

    let summary = &result.summary;
    println!("\nSummary:");
    println!("  Years Simulated: {}", summary.years_simulated);
    println!("  Success Rate: {:.1}%", summary.success_rate * 100.0);
    println!("  Total Tax: ${:.2}", summary.total_tax);
    println!("  Total OAS Clawback: ${:.2}", summary.total_oas_clawback);
    println!("  Effective Rate: {:.2}%", summary.average_effective_rate * 100.0);
    println!("  Final Gross Estate: ${:.2}", summary.final_gross_estate);
    println!("  Final After-tax Estate: ${:.2}", summary.final_after_tax_estate);

    Ok(())
}

fn print_comparison_header() {
    println!("\nStrategy comparison:");
    println!(
        "{:<32} {:>8} {:>14} {:>12} {:>14}",
        "Strategy", "Success", "Total tax", "Clawback", "After-tax est."
    );
    println!("{}", "-".repeat(84));
}

fn print_comparison_row(result: &SimulationResult) {
    let s = &result.summary;
    println!(
        "{:<32} {:>7.1}% {:>14.2} {:>12.2} {:>14.2}",
        result.strategy.to_string(),
        s.success_rate * 100.0,
        s.total_tax,
        s.total_oas_clawback,
        s.final_after_tax_estate
    );
}
