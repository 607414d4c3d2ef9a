//! Grid builder.
//!
//! Walks the rule table in row order and, for every row, fills columns
//! `1..=columns` strictly left to right. Cross-row references are emitted as
//! formula text; only recurrences carry a numeric accumulator from one column
//! to the next.

use super::cell::{Cell, CellContent, Grid};
use super::cell_ref::ColumnMapper;
use super::rules::{RowFormula, RowRuleTable, Seed, Step};
use crate::error::{BuildError, Result};
use crate::model::Scenario;

/// Build the grid for one scenario.
///
/// Fails with [`BuildError::MissingSeed`] when a recurrence has no column-1
/// seed; nothing is returned for the scenario in that case.
pub fn build_grid(
    scenario: &Scenario,
    table: &RowRuleTable,
    mapper: ColumnMapper,
    columns: usize,
) -> Result<Grid> {
    let mut cells = Vec::with_capacity(table.len() * columns);

    for rule in table.iter() {
        let row = rule.row;
        match rule.formula_for(scenario) {
            RowFormula::Blank => {
                cells.extend((1..=columns).map(|c| Cell::new(row, c, CellContent::Blank)));
            }
            RowFormula::Schedule(schedule) => {
                cells.extend(
                    (1..=columns)
                        .map(|c| Cell::new(row, c, CellContent::Number(schedule.value(c, columns)))),
                );
            }
            RowFormula::Formula(expr) => {
                cells.extend(
                    (1..=columns)
                        .map(|c| Cell::new(row, c, CellContent::formula(expr.formula(&mapper.label(c))))),
                );
            }
            RowFormula::Recurrence { seed, step } => {
                let seed = seed.as_ref().ok_or_else(|| BuildError::MissingSeed {
                    scenario: scenario.name(),
                    row,
                })?;
                build_recurrence(row, seed, step, mapper, columns, &mut cells);
            }
        }
    }

    Ok(Grid::new(*scenario, columns, mapper, cells))
}

fn build_recurrence(
    row: u32,
    seed: &Seed,
    step: &Step,
    mapper: ColumnMapper,
    columns: usize,
    cells: &mut Vec<Cell>,
) {
    if columns == 0 {
        return;
    }

    let first = match seed {
        Seed::Literal(v) => CellContent::Number(*v),
        Seed::Anchor { addr, value } => CellContent::Formula {
            text: format!("={}", addr),
            value: Some(*value),
        },
    };
    cells.push(Cell::new(row, 1, first));

    let mut acc = Some(seed.value());
    let mut prev_label = mapper.label(1);
    for c in 2..=columns {
        let label = mapper.label(c);
        let content = match (acc.and_then(|prev| step.advance(prev)), step.render(&prev_label, row)) {
            (Some(value), Some(body)) => {
                acc = Some(value);
                CellContent::Formula {
                    text: format!("={}", body),
                    value: Some(value),
                }
            }
            _ => {
                acc = None;
                CellContent::Blank
            }
        };
        cells.push(Cell::new(row, c, content));
        prev_label = label;
    }
}
