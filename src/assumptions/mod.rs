//! Tax-year parameters, RRIF minimums, and the (jurisdiction, year) index

mod defaults;
mod params;
mod rrif;
pub mod loader;

pub use defaults::{federal_2025, ontario_2025, ontario_params_2025};
pub use params::{
    Bracket, DividendGrossUp, GisParams, GisSchedule, JurisdictionParams, OasParams, TaxParams,
    TfsaParams,
};
pub use rrif::{RrifFactor, RrifMinimumTable};

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Immutable index of parameter sets keyed by jurisdiction, then tax year
#[derive(Debug, Clone, Default)]
pub struct TaxTables {
    tables: BTreeMap<String, BTreeMap<i32, JurisdictionParams>>,
}

impl TaxTables {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in 2025 federal + Ontario parameters
    pub fn default_2025() -> Self {
        let mut tables = Self::new();
        tables.tables.entry("ON".to_string()).or_default().insert(2025, ontario_params_2025());
        tables
    }

    /// Load a JSON array of parameter sets
    pub fn from_json_path(path: &Path) -> Result<Self, ConfigError> {
        let mut tables = Self::new();
        for params in loader::load_tax_tables(path)? {
            tables.insert(params)?;
        }
        Ok(tables)
    }

    /// Validate and add a parameter set, replacing any existing (jurisdiction, year)
    pub fn insert(&mut self, params: JurisdictionParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.tables
            .entry(params.jurisdiction.clone())
            .or_default()
            .insert(params.year, params);
        Ok(())
    }

    /// Replace the RRIF schedule on every loaded parameter set
    pub fn with_rrif_minimums(mut self, table: RrifMinimumTable) -> Result<Self, ConfigError> {
        table.validate()?;
        for years in self.tables.values_mut() {
            for params in years.values_mut() {
                params.rrif_minimums = table.clone();
            }
        }
        Ok(self)
    }

    /// Parameters for `year`, falling back to the latest year at or before it
    pub fn params_for(&self, jurisdiction: &str, year: i32) -> Result<&JurisdictionParams, ConfigError> {
        let years = self
            .tables
            .get(jurisdiction)
            .ok_or_else(|| ConfigError::UnknownJurisdiction(jurisdiction.to_string()))?;

        years
            .range(..=year)
            .next_back()
            .map(|(_, params)| params)
            .ok_or_else(|| ConfigError::NoParamsForYear {
                jurisdiction: jurisdiction.to_string(),
                year,
            })
    }

    pub fn jurisdictions(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}
