//! Cell and grid data structures.
//!
//! - [`CellContent`] - what a cell holds (number, formula, text or blank)
//! - [`Cell`] - a positioned cell in the iteration area
//! - [`Grid`] - the immutable, ordered cell collection built for one scenario

use super::cell_ref::{CellAddr, ColumnMapper};
use crate::model::Scenario;

/// The content stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    /// Explicitly empty. Not the same as zero.
    Blank,
    Number(f64),
    Text(String),
    /// Formula text including the leading `=`. `value` is the result when the
    /// builder already knows it (recurrence rows).
    Formula { text: String, value: Option<f64> },
}

impl CellContent {
    pub fn formula(text: String) -> CellContent {
        CellContent::Formula { text, value: None }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellContent::Blank)
    }
}

/// A cell in the iteration area. `column` is the logical iteration (1-based).
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub column: usize,
    pub content: CellContent,
}

impl Cell {
    pub fn new(row: u32, column: usize, content: CellContent) -> Cell {
        Cell {
            row,
            column,
            content,
        }
    }

    /// Numeric value if the cell has one (literal or known formula result).
    pub fn value(&self) -> Option<f64> {
        match &self.content {
            CellContent::Number(n) => Some(*n),
            CellContent::Formula { value, .. } => *value,
            CellContent::Blank | CellContent::Text(_) => None,
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// All iteration cells of one scenario, sorted by row then column.
///
/// Built in one pass and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Grid {
    scenario: Scenario,
    columns: usize,
    mapper: ColumnMapper,
    cells: Vec<Cell>,
}

impl Grid {
    pub(crate) fn new(scenario: Scenario, columns: usize, mapper: ColumnMapper, mut cells: Vec<Cell>) -> Grid {
        cells.sort_by(|a, b| a.row.cmp(&b.row).then(a.column.cmp(&b.column)));
        Grid {
            scenario,
            columns,
            mapper,
            cells,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Iteration count.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn mapper(&self) -> ColumnMapper {
        self.mapper
    }

    pub fn get(&self, row: u32, column: usize) -> Option<&Cell> {
        self.cells
            .binary_search_by(|c| c.row.cmp(&row).then(c.column.cmp(&column)))
            .ok()
            .map(|i| &self.cells[i])
    }

    pub fn value(&self, row: u32, column: usize) -> Option<f64> {
        self.get(row, column).and_then(Cell::value)
    }

    pub fn formula(&self, row: u32, column: usize) -> Option<&str> {
        self.get(row, column).and_then(Cell::formula)
    }

    /// All cells of one row, in column order.
    pub fn row(&self, row: u32) -> &[Cell] {
        let start = self.cells.partition_point(|c| c.row < row);
        let end = self.cells.partition_point(|c| c.row <= row);
        &self.cells[start..end]
    }

    /// Rows that have at least one cell, ascending.
    pub fn rows(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self.cells.iter().map(|c| c.row).collect();
        rows.dedup();
        rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sheet address of an iteration cell.
    pub fn address(&self, cell: &Cell) -> CellAddr {
        CellAddr::new(self.mapper.sheet_column(cell.column), cell.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Leverage, TaxShield};

    fn scenario() -> Scenario {
        Scenario::new(TaxShield::None, Leverage::Leveraged)
    }

    #[test]
    fn test_grid_sorts_and_looks_up() {
        let grid = Grid::new(
            scenario(),
            2,
            ColumnMapper::default(),
            vec![
                Cell::new(5, 2, CellContent::formula("=J19*J24".into())),
                Cell::new(4, 1, CellContent::Number(10000.0)),
                Cell::new(5, 1, CellContent::formula("=I19*I24".into())),
            ],
        );
        assert_eq!(grid.rows(), vec![4, 5]);
        assert_eq!(grid.row(5).len(), 2);
        assert_eq!(grid.value(4, 1), Some(10000.0));
        assert_eq!(grid.formula(5, 2), Some("=J19*J24"));
        assert!(grid.get(6, 1).is_none());
        let cell = grid.get(5, 2).unwrap();
        assert_eq!(grid.address(cell).to_string(), "J5");
    }
}
