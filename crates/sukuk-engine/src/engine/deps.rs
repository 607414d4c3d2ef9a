//! Symbolic dependency extraction from formula text.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::cell::Grid;
use super::cell_ref::{CellAddr, column_number};

/// Extract every cell reference from formula text, in order of appearance.
pub fn extract_dependencies(formula: &str) -> Vec<CellAddr> {
    cell_ref_re()
        .captures_iter(formula)
        .filter_map(|caps| {
            let col = column_number(&caps[1])?;
            let row = caps[2].parse::<u32>().ok().filter(|r| *r > 0)?;
            Some(CellAddr::new(col, row))
        })
        .collect()
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+)([0-9]+)\b").expect("dependency cell reference regex must compile")
    })
}

/// Row -> rows edges for references that stay inside one iteration column.
///
/// References to the previous column (recurrences) and to anchor cells left of
/// the iteration area are not same-column edges and are dropped.
pub fn same_column_graph(grid: &Grid, column: usize) -> BTreeMap<u32, Vec<u32>> {
    let sheet_column = grid.mapper().sheet_column(column);
    let mut graph = BTreeMap::new();

    for row in grid.rows() {
        let Some(formula) = grid.formula(row, column) else {
            continue;
        };
        let mut deps: Vec<u32> = extract_dependencies(formula)
            .into_iter()
            .filter(|addr| addr.col == sheet_column)
            .map(|addr| addr.row)
            .collect();
        deps.dedup();
        graph.insert(row, deps);
    }

    graph
}
