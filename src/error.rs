//! Error taxonomy for configuration, input validation and simulation runs
//!
//! Configuration and input errors are fatal and surface before any year is
//! simulated. Convergence warnings and unfunded years are recorded on the
//! year records instead. Invariant violations should never occur.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal error while loading or resolving tax parameters and account layouts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown jurisdiction '{0}'")]
    UnknownJurisdiction(String),

    #[error("no tax parameters for {jurisdiction} at or before {year}")]
    NoParamsForYear { jurisdiction: String, year: i32 },

    #[error("malformed bracket in {context}: {reason}")]
    MalformedBracket { context: String, reason: String },

    #[error("{field} = {value} is outside [0, 1]")]
    RateOutOfRange { field: String, value: f64 },

    #[error("RRIF schedule jumps from age {previous} to {next}")]
    RrifScheduleGap { previous: u32, next: u32 },

    #[error("unknown withdrawal strategy '{0}'")]
    UnknownStrategy(String),

    #[error("allocation for {account} sums to {total:.4}, expected 1.0")]
    AllocationMismatch { account: String, total: f64 },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal problem with the household supplied to a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("{person}: {account} balance is negative ({value})")]
    NegativeBalance {
        person: String,
        account: String,
        value: f64,
    },

    #[error("{person}: {account} ACB {acb} exceeds market value {market_value}")]
    AcbExceedsMarketValue {
        person: String,
        account: String,
        acb: f64,
        market_value: f64,
    },

    #[error("{person}: {what} start age {age} outside {min}..={max}")]
    StartAgeOutOfRange {
        person: String,
        what: String,
        age: u32,
        min: u32,
        max: u32,
    },

    #[error("end age {end_age} must be greater than current age {current_age}")]
    EndAgeNotAfterStart { end_age: u32, current_age: u32 },

    #[error("{field} = {value} is not a decimal rate (did you pass a percentage?)")]
    InvalidRate { field: String, value: f64 },

    #[error("income split fraction {0} outside [0, 0.5]")]
    InvalidSplitFraction(f64),

    #[error("gap tolerance {0} must be non-negative")]
    NegativeGapTolerance(f64),

    #[error("spending phase end ages must be non-decreasing (go-go {go_go}, slow-go {slow_go})")]
    SpendingPhases { go_go: u32, slow_go: u32 },
}

/// Errors that prevent a simulation from starting
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputValidationError),
}

/// Resolver hit its iteration cap with a residual gap above tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub iterations: u32,
    pub residual_gap: f64,
}

/// A broken invariant on a year record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("year {year}: {account} balance for person {person} is negative ({value})")]
    NegativeBalance {
        year: i32,
        person: usize,
        account: &'static str,
        value: f64,
    },

    #[error("year {year}: ACB {acb} for person {person} outside [0, {market_value}]")]
    AcbOutOfRange {
        year: i32,
        person: usize,
        acb: f64,
        market_value: f64,
    },

    #[error("year {year}: net tax for person {person} is negative ({value})")]
    NegativeTax { year: i32, person: usize, value: f64 },

    #[error("year {year}: OAS clawback {clawback} exceeds OAS {oas} for person {person}")]
    ClawbackExceedsOas {
        year: i32,
        person: usize,
        clawback: f64,
        oas: f64,
    },

    #[error("year {year}: taxable income {recorded} for person {person} != {expected}")]
    TaxableIncomeMismatch {
        year: i32,
        person: usize,
        recorded: f64,
        expected: f64,
    },

    #[error("year {year}: funded but after-tax cash {cash} < target {target} - tolerance")]
    FundedBelowTarget { year: i32, cash: f64, target: f64 },

    #[error("year {year}: {series} decreased from {previous} to {current}")]
    CumulativeDecrease {
        year: i32,
        series: &'static str,
        previous: f64,
        current: f64,
    },

    #[error("year {year}: RRIF withdrawal {withdrawn} below minimum {minimum} for person {person}")]
    RrifMinimumMissed {
        year: i32,
        person: usize,
        withdrawn: f64,
        minimum: f64,
    },
}
