//! Household inputs: persons, accounts, spending profile and run settings

pub mod accounts;
mod data;
pub mod loader;
mod validate;

pub use accounts::{
    Allocation, Bucket, BucketedAccount, CorporateAccount, CorporateDividend, Distributions,
    DividendClass, EarlyRrif, RegisteredAccount, Sale, SaleOrder, TfsaAccount, YieldMix,
};
pub use data::{
    BenefitElection, ClawbackBasis, Household, IncomeKind, OtherIncome, Pension, Person,
    SpendingProfile,
};
pub use loader::load_household;
pub use validate::validate_household;
