//! Withdrawal strategies and the per-year resolver
//!
//! Order of work inside a year: mandatory registered draws, discretionary
//! draws by strategy until the after-tax target is met, one pension-split
//! trial for couples, then reinvestment of any surplus.

mod resolver;
mod split;
mod strategy;
mod surplus;

pub use resolver::{
    mandatory_draw, resolve, Draws, MandatoryDraw, PersonContext, PersonResolution, Resolution,
    ResolverInput, MAX_ITERATIONS,
};
pub use split::{trial_split, SplitOutcome};
pub use strategy::{
    AccountClass, DrawStep, IncomeThreshold, Strategy, StrategyKind, DEFAULT_FRONTLOAD_POST_OAS,
    DEFAULT_FRONTLOAD_PRE_OAS,
};
pub use surplus::{allocate_surplus, Contribution};
