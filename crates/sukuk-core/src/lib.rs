//! sukuk-core - Workbook assembly, configuration and storage.

pub mod config;
pub mod error;
pub mod storage;
pub mod workbook;

pub use config::{Mode, SukukConfig};
pub use error::{Result, SukukError};
pub use workbook::{AssembleOptions, Assembly, Sheet, Workbook, assemble};
