//! Formula-grid engine.
//!
//! - [`column_label`], [`CellAddr`], [`ColumnMapper`] - column addressing
//! - [`Expr`] - column-agnostic formula templates
//! - [`RowRule`], [`RowRuleTable`] - per-row rules with ordered branches
//! - [`build_grid`] - fill one scenario's grid
//! - [`extract_dependencies`], [`find_row_cycle`] - symbolic dependency checks
//! - [`OfflineModel`] - eager numeric evaluation of the same rules

mod builder;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod expr;
mod offline;
mod rules;

pub use builder::build_grid;
pub use cell::{Cell, CellContent, Grid};
pub use cell_ref::{CellAddr, ColumnMapper, column_label, column_number};
pub use cycle::{RowCycle, detect_row_cycle, find_row_cycle};
pub use deps::{extract_dependencies, same_column_graph};
pub use expr::{Expr, Op, Resolve, anchor, format_number, num, row};
pub use offline::{ComputedRows, OfflineModel, RuleSeeds, SeedSource};
pub use rules::{Branch, Predicate, RowFormula, RowRule, RowRuleTable, RuleKind, Schedule, Seed, Step};
