//! Recurrence seeds read from an existing workbook.
//!
//! The seed for row `r` of a scenario lives in the sheet named after the
//! scenario, at `<seed_column><r + row_offset>`. A missing sheet or cell is
//! treated as zero and logged.

use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use sukuk_engine::engine::{CellAddr, SeedSource, column_number};
use sukuk_engine::model::Scenario;
use tracing::warn;

use crate::error::{Result, SukukError};

pub struct WorkbookSeeds {
    sheets: HashMap<String, Range<Data>>,
    column: usize,
    row_offset: u32,
}

impl WorkbookSeeds {
    pub fn open(path: &Path, seed_column: &str, row_offset: u32) -> Result<Self> {
        let column = column_number(seed_column).ok_or_else(|| {
            SukukError::Config(format!("seed_column '{}' is not a column label", seed_column))
        })?;

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            SukukError::SeedWorkbook(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let names: Vec<String> = workbook.sheet_names().to_vec();
        let mut sheets = HashMap::with_capacity(names.len());
        for name in names {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                SukukError::SeedWorkbook(format!("Failed to read sheet '{}': {}", name, e))
            })?;
            sheets.insert(name, range);
        }

        Ok(WorkbookSeeds {
            sheets,
            column,
            row_offset,
        })
    }

    fn lookup(&self, sheet: &str, addr: CellAddr) -> Option<f64> {
        let range = self.sheets.get(sheet)?;
        let pos = (addr.row.checked_sub(1)?, u32::try_from(addr.col.checked_sub(1)?).ok()?);
        match range.get_value(pos)? {
            Data::Float(f) => Some(*f),
            Data::Int(i) => Some(*i as f64),
            Data::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl SeedSource for WorkbookSeeds {
    fn seed(&self, scenario: &Scenario, row: u32) -> Option<f64> {
        let sheet = scenario.name();
        let addr = CellAddr::new(self.column, row + self.row_offset);
        match self.lookup(&sheet, addr) {
            Some(value) => Some(value),
            None => {
                warn!("Seed {}!{} missing or not numeric, using 0", sheet, addr);
                Some(0.0)
            }
        }
    }
}
