//! Error types for the grid builder.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Scenario {scenario}: row {row} is a recurrence without a column-1 seed")]
    MissingSeed { scenario: String, row: u32 },
}

pub type Result<T> = std::result::Result<T, BuildError>;
