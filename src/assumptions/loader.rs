//! File-based parameter loaders
//!
//! Tax parameters come from a JSON array of `JurisdictionParams`; the RRIF
//! schedule can be overridden from an `age,factor` CSV.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::params::JurisdictionParams;
use super::rrif::RrifMinimumTable;
use crate::error::ConfigError;

#[derive(Debug, serde::Deserialize)]
struct RrifRow {
    age: u32,
    factor: f64,
}

/// Load every parameter set from a JSON array
pub fn load_tax_tables(path: &Path) -> Result<Vec<JurisdictionParams>, ConfigError> {
    let file = File::open(path)?;
    let params: Vec<JurisdictionParams> = serde_json::from_reader(BufReader::new(file))?;
    Ok(params)
}

/// Load RRIF minimum factors from CSV with `age,factor` headers
pub fn load_rrif_factors(path: &Path) -> Result<RrifMinimumTable, ConfigError> {
    let file = File::open(path)?;
    read_rrif_factors(file)
}

fn read_rrif_factors<R: std::io::Read>(reader: R) -> Result<RrifMinimumTable, ConfigError> {
    let mut reader = csv::Reader::from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: RrifRow = result?;
        rows.push((row.age, row.factor));
    }

    let table = RrifMinimumTable::from_loaded(&rows);
    table.validate()?;
    Ok(table)
}
