//! The sukuk leverage model: scenarios, row catalogue and sheet layout.

pub mod layout;
mod rows;
mod scenario;

pub use rows::sukuk_rules;
pub use scenario::{Leverage, Scenario, ScenarioFlags, TaxShield, all_scenarios};
