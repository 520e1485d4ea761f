//! Multi-year simulation: year driver, account evolution, records and estate

mod engine;
mod estate;
mod evolution;
pub mod invariants;
pub mod records;
mod state;

pub use engine::{SimulationConfig, SimulationEngine};
pub use estate::{terminal_estate, EstateRecord, PersonEstate};
pub use evolution::CorporateYear;
pub use records::{write_csv, Balances, PersonYear, SimulationResult, Summary, YearRecord};
pub use state::{CarryState, PersonState};
