//! Sheet sinks and the seed workbook reader.

mod grd;
mod seeds;
mod xlsx;

pub use grd::{GrdSink, write_grd_content};
pub use seeds::WorkbookSeeds;
pub use xlsx::XlsxSink;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Result;
use crate::workbook::Workbook;

/// Counts from one workbook write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub sheets: usize,
    pub numbers: usize,
    pub formulas: usize,
    pub text: usize,
    /// Cells whose value is not a number (written as `=NA()`).
    pub nan_cells: usize,
    pub files: Vec<PathBuf>,
}

/// Destination for an assembled workbook.
pub trait SheetSink {
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<SinkReport>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SinkFormat {
    #[default]
    Xlsx,
    Grd,
}

impl FromStr for SinkFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(SinkFormat::Xlsx),
            "grd" => Ok(SinkFormat::Grd),
            other => Err(format!("Unknown format '{}' (expected xlsx or grd)", other)),
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkFormat::Xlsx => write!(f, "xlsx"),
            SinkFormat::Grd => write!(f, "grd"),
        }
    }
}

/// Sink for `format` writing to (or next to) `path`.
pub fn sink_for(format: SinkFormat, path: &Path) -> Box<dyn SheetSink> {
    match format {
        SinkFormat::Xlsx => Box::new(XlsxSink::new(path)),
        SinkFormat::Grd => Box::new(GrdSink::new(path)),
    }
}
