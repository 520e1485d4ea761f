//! Scenario runner for batch and strategy-comparison simulations
//!
//! Loads tax tables once, then runs many simulations against them. Each run
//! owns its carry state, so runs execute in parallel on the rayon pool.

use std::path::Path;

use rayon::prelude::*;

use crate::assumptions::{loader, TaxTables};
use crate::error::{ConfigError, SimulationError};
use crate::household::Household;
use crate::projection::{SimulationConfig, SimulationEngine, SimulationResult};
use crate::withdrawal::{IncomeThreshold, Strategy, StrategyKind};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// for (strategy, result) in runner.compare_strategies(&household, &ScenarioRunner::all_strategies()) {
///     println!("{strategy}: {:?}", result?.summary);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: SimulationEngine,
}

impl ScenarioRunner {
    /// Runner with the built-in 2025 tables
    pub fn new() -> Self {
        Self {
            engine: SimulationEngine::with_defaults(),
        }
    }

    /// Runner with tables loaded from a JSON file, optionally overriding the
    /// RRIF minimum factors from CSV
    pub fn from_paths(tax_params: &Path, rrif_factors: Option<&Path>) -> Result<Self, ConfigError> {
        let mut tables = TaxTables::from_json_path(tax_params)?;
        if let Some(path) = rrif_factors {
            tables = tables.with_rrif_minimums(loader::load_rrif_factors(path)?)?;
        }
        Ok(Self::with_tables(tables, SimulationConfig::default()))
    }

    pub fn with_tables(tables: TaxTables, config: SimulationConfig) -> Self {
        Self {
            engine: SimulationEngine::new(tables, config),
        }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Run a single simulation
    pub fn run(&self, household: &Household) -> Result<SimulationResult, SimulationError> {
        self.engine.run(household)
    }

    /// Run several households in parallel
    pub fn run_batch(&self, households: &[Household]) -> Vec<Result<SimulationResult, SimulationError>> {
        households.par_iter().map(|h| self.engine.run(h)).collect()
    }

    /// Run one household under each strategy, in input order
    pub fn compare_strategies(
        &self,
        household: &Household,
        strategies: &[Strategy],
    ) -> Vec<(Strategy, Result<SimulationResult, SimulationError>)> {
        strategies
            .par_iter()
            .map(|&strategy| {
                let mut variant = household.clone();
                variant.strategy = strategy;
                (strategy, self.engine.run(&variant))
            })
            .collect()
    }

    /// Every built-in strategy, plus the two guarded TFSA variants
    pub fn all_strategies() -> Vec<Strategy> {
        vec![
            Strategy::new(StrategyKind::MinimizeIncome),
            Strategy::new(StrategyKind::Balanced),
            Strategy::new(StrategyKind::TfsaFirst),
            Strategy::guarded(StrategyKind::TfsaFirst, IncomeThreshold::NextBracket),
            Strategy::guarded(StrategyKind::TfsaFirst, IncomeThreshold::OasClawback),
            Strategy::new(StrategyKind::CorporateOptimized),
            Strategy::rrif_frontload(),
            Strategy::new(StrategyKind::CapitalGainsOptimized),
        ]
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
