//! Row-wise cycle detection.
//!
//! Within one iteration column the rows of a sheet must form a DAG: if row 10
//! reads row 9 and row 9 reads row 10, the spreadsheet can never settle. This
//! runs a depth-first search over the symbolic references of each column.

use std::collections::{BTreeMap, HashSet};

use super::cell::Grid;
use super::deps::same_column_graph;

/// A cycle found in one column, as the chain of rows that closes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowCycle {
    pub column: usize,
    pub path: Vec<u32>,
}

/// Detect a cycle in a row graph. Returns the path (ending on the repeated
/// row) if one exists.
pub fn detect_row_cycle(graph: &BTreeMap<u32, Vec<u32>>) -> Option<Vec<u32>> {
    let mut done = HashSet::new();
    for &start in graph.keys() {
        if done.contains(&start) {
            continue;
        }
        let mut visiting = HashSet::new();
        let mut path = Vec::new();
        if detect_cycle_dfs(start, graph, &mut visiting, &mut done, &mut path) {
            return Some(path);
        }
    }
    None
}

fn detect_cycle_dfs(
    current: u32,
    graph: &BTreeMap<u32, Vec<u32>>,
    visiting: &mut HashSet<u32>,
    done: &mut HashSet<u32>,
    path: &mut Vec<u32>,
) -> bool {
    if visiting.contains(&current) {
        path.push(current);
        return true;
    }
    if done.contains(&current) {
        return false;
    }

    let Some(deps) = graph.get(&current) else {
        return false;
    };

    visiting.insert(current);
    path.push(current);

    for &dep in deps {
        if detect_cycle_dfs(dep, graph, visiting, done, path) {
            return true;
        }
    }

    path.pop();
    visiting.remove(&current);
    done.insert(current);
    false
}

/// Check every column of a grid. Returns the first cycle found.
pub fn find_row_cycle(grid: &Grid) -> Option<RowCycle> {
    (1..=grid.columns()).find_map(|column| {
        detect_row_cycle(&same_column_graph(grid, column)).map(|path| RowCycle { column, path })
    })
}
