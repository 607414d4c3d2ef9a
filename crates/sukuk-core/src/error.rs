//! Error types for sukuk core.

use thiserror::Error;

use sukuk_engine::BuildError;

#[derive(Error, Debug)]
pub enum SukukError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Seed workbook error: {0}")]
    SeedWorkbook(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Scenario {scenario}: rows {path:?} form a cycle in iteration column {column}")]
    Cycle {
        scenario: String,
        column: usize,
        path: Vec<u32>,
    },
}

pub type Result<T> = std::result::Result<T, SukukError>;
