//! Retirement System - multi-year Canadian retirement cash-flow and tax engine
//!
//! This library provides:
//! - Federal and provincial income tax with credits and the OAS recovery tax
//! - CPP, OAS and GIS benefit calculations
//! - A fixed-point withdrawal resolver across TFSA, RRIF, non-registered
//!   and corporate accounts
//! - Year-by-year projection with estate tax in the terminal year
//! - Parallel strategy comparison

pub mod assumptions;
pub mod benefits;
pub mod error;
pub mod household;
pub mod income;
pub mod projection;
pub mod scenario;
pub mod tax;
pub mod withdrawal;

// Re-export commonly used types
pub use assumptions::{JurisdictionParams, TaxTables};
pub use error::{ConfigError, ConvergenceWarning, InputValidationError, InvariantViolation, SimulationError};
pub use household::{Household, Person};
pub use projection::{SimulationConfig, SimulationEngine, SimulationResult, Summary, YearRecord};
pub use scenario::ScenarioRunner;
pub use withdrawal::{Strategy, StrategyKind};
