//! Workbook model: one sheet per scenario.

mod assemble;

pub use assemble::{AssembleOptions, Assembly, assemble, build_sheet};

use sukuk_engine::engine::Grid;
use sukuk_engine::model::Scenario;
use sukuk_engine::model::layout::{HiddenRow, MetaCell};

/// A fully assembled scenario sheet.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub scenario: Scenario,
    pub grid: Grid,
    /// Title, header, labels and anchor table.
    pub metadata: Vec<MetaCell>,
    pub hidden_rows: Vec<HiddenRow>,
}

impl Sheet {
    pub fn name(&self) -> String {
        self.scenario.name()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let scenario = Scenario::from_name(name)?;
        self.sheets.iter().find(|s| s.scenario == scenario)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
