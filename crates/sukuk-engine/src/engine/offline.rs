//! Offline numeric evaluation.
//!
//! Instead of emitting formula text, every row is computed eagerly into a
//! numeric array. Rows are evaluated in dependency order (leaves first); a row
//! that reads a row which was never computed comes out as all-NaN, and a zero
//! divisor yields NaN only in the columns where it occurs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::cell::{Cell, CellContent, Grid};
use super::cell_ref::{CellAddr, ColumnMapper};
use super::expr::Resolve;
use super::rules::{RowFormula, RowRuleTable};
use crate::model::Scenario;

/// Row number -> one value per iteration column.
pub type ComputedRows = BTreeMap<u32, Vec<f64>>;

/// Where recurrence rows get their column-1 value from.
pub trait SeedSource {
    /// `None` means "no external seed"; the rule's own seed is used instead.
    fn seed(&self, scenario: &Scenario, row: u32) -> Option<f64>;
}

/// Uses the seeds written in the rule table.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleSeeds;

impl SeedSource for RuleSeeds {
    fn seed(&self, _scenario: &Scenario, _row: u32) -> Option<f64> {
        None
    }
}

impl<S: SeedSource + ?Sized> SeedSource for &S {
    fn seed(&self, scenario: &Scenario, row: u32) -> Option<f64> {
        (**self).seed(scenario, row)
    }
}

/// One scenario's rule table bound to its seeds and anchor values.
pub struct OfflineModel<'a, S: SeedSource> {
    pub scenario: Scenario,
    pub table: &'a RowRuleTable,
    pub seeds: S,
    pub anchors: HashMap<CellAddr, f64>,
}

struct ColumnEnv<'a> {
    computed: &'a ComputedRows,
    anchors: &'a HashMap<CellAddr, f64>,
    index: usize,
}

impl Resolve for ColumnEnv<'_> {
    fn row(&self, row: u32) -> f64 {
        self.computed
            .get(&row)
            .and_then(|values| values.get(self.index))
            .copied()
            .unwrap_or(f64::NAN)
    }

    fn anchor(&self, addr: CellAddr) -> f64 {
        self.anchors.get(&addr).copied().unwrap_or(f64::NAN)
    }
}

impl<'a, S: SeedSource> OfflineModel<'a, S> {
    pub fn new(scenario: Scenario, table: &'a RowRuleTable, seeds: S, anchors: HashMap<CellAddr, f64>) -> Self {
        OfflineModel {
            scenario,
            table,
            seeds,
            anchors,
        }
    }

    /// Compute one row from already-computed rows.
    ///
    /// Unknown rows, rows whose dependencies are missing from `computed`, and
    /// recurrences without any seed are all-NaN. Explicitly blank cells are
    /// zero, the value a spreadsheet gives an empty cell.
    pub fn compute_row(&self, row_number: u32, computed: &ComputedRows, columns: usize) -> Vec<f64> {
        let nan_row = || vec![f64::NAN; columns];
        let Some(rule) = self.table.get(row_number) else {
            return nan_row();
        };

        match rule.formula_for(&self.scenario) {
            RowFormula::Blank => vec![0.0; columns],
            RowFormula::Schedule(schedule) => (1..=columns).map(|c| schedule.value(c, columns)).collect(),
            RowFormula::Formula(expr) => {
                if expr.rows().iter().any(|dep| !computed.contains_key(dep)) {
                    return nan_row();
                }
                (0..columns)
                    .map(|index| {
                        expr.eval(&ColumnEnv {
                            computed,
                            anchors: &self.anchors,
                            index,
                        })
                    })
                    .collect()
            }
            RowFormula::Recurrence { seed, step } => {
                let Some(first) = self
                    .seeds
                    .seed(&self.scenario, row_number)
                    .or_else(|| seed.map(|s| s.value()))
                else {
                    return nan_row();
                };
                let mut values = Vec::with_capacity(columns);
                let mut acc = Some(first);
                for c in 1..=columns {
                    if c > 1 {
                        acc = acc.and_then(|prev| step.advance(prev));
                    }
                    values.push(acc.unwrap_or(0.0));
                }
                values
            }
        }
    }

    /// Rows ordered so every row comes after the rows it reads. Ties and
    /// independent rows go in ascending row order; rows caught in a cycle
    /// are appended last.
    pub fn evaluation_order(&self) -> Vec<u32> {
        let rows = self.table.rows();
        let mut deps: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        let mut dependents: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

        for &row in &rows {
            let Some(rule) = self.table.get(row) else {
                continue;
            };
            let known: BTreeSet<u32> = rule
                .formula_for(&self.scenario)
                .dependencies()
                .into_iter()
                .filter(|d| self.table.get(*d).is_some())
                .collect();
            for &d in &known {
                dependents.entry(d).or_default().push(row);
            }
            deps.insert(row, known);
        }

        let mut ready: BTreeSet<u32> = deps
            .iter()
            .filter(|(_, d)| d.is_empty())
            .map(|(r, _)| *r)
            .collect();
        let mut order = Vec::with_capacity(rows.len());

        while let Some(row) = ready.pop_first() {
            order.push(row);
            for dependent in dependents.get(&row).into_iter().flatten() {
                if let Some(pending) = deps.get_mut(dependent) {
                    pending.remove(&row);
                    if pending.is_empty() {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        let placed: BTreeSet<u32> = order.iter().copied().collect();
        order.extend(rows.into_iter().filter(|r| !placed.contains(r)));
        order
    }

    /// Compute every row of the table.
    pub fn compute_all(&self, columns: usize) -> ComputedRows {
        let order = self.evaluation_order();
        let mut computed = ComputedRows::new();
        for row in order {
            let values = self.compute_row(row, &computed, columns);
            computed.insert(row, values);
        }
        computed
    }

    /// Turn computed arrays into a literal-only grid. Cells that are blank in
    /// the formula grid stay blank.
    pub fn values_grid(&self, computed: &ComputedRows, mapper: ColumnMapper, columns: usize) -> Grid {
        let mut cells = Vec::with_capacity(computed.len() * columns);
        for (&row, values) in computed {
            let formula = self.table.get(row).map(|r| r.formula_for(&self.scenario));
            for (index, &value) in values.iter().enumerate().take(columns) {
                let column = index + 1;
                let content = match formula {
                    Some(f) if f.is_blank_at(column) => CellContent::Blank,
                    _ => CellContent::Number(value),
                };
                cells.push(Cell::new(row, column, content));
            }
        }
        Grid::new(self.scenario, columns, mapper, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::expr::row;
    use crate::engine::rules::{RowRule, Seed, Step};
    use crate::model::{Leverage, TaxShield};

    fn base() -> Scenario {
        Scenario::new(TaxShield::None, Leverage::Leveraged)
    }

    struct FixedSeeds(f64);

    impl SeedSource for FixedSeeds {
        fn seed(&self, _scenario: &Scenario, _row: u32) -> Option<f64> {
            Some(self.0)
        }
    }

    #[test]
    fn test_missing_dependency_is_all_nan() {
        let table = RowRuleTable::new().with(RowRule::new(11, row(10) * row(22)));
        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        let values = model.compute_row(11, &ComputedRows::new(), 4);
        assert_eq!(values.len(), 4);
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_zero_divisor_only_poisons_its_columns() {
        let table = RowRuleTable::new().with(RowRule::new(39, row(19) / row(21)));
        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        let computed = ComputedRows::from([(19, vec![10.0, 20.0, 30.0]), (21, vec![100.0, 0.0, 60.0])]);
        let values = model.compute_row(39, &computed, 3);
        assert_eq!(values[0], 0.1);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 0.5);
    }

    #[test]
    fn test_order_puts_dependencies_first() {
        let table = RowRuleTable::new()
            .with(RowRule::new(12, row(10) - row(11)))
            .with(RowRule::new(11, row(10) * row(22)))
            .with(RowRule::new(10, row(4) - row(5)))
            .with(RowRule::new(4, RowFormula::constant(1.0)))
            .with(RowRule::new(22, RowFormula::constant(0.35)));
        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        let order = model.evaluation_order();
        let pos = |r: u32| order.iter().position(|x| *x == r).unwrap();
        assert!(pos(4) < pos(10));
        assert!(pos(10) < pos(11));
        assert!(pos(22) < pos(11));
        assert!(pos(11) < pos(12));
    }

    #[test]
    fn test_cycle_rows_come_out_nan() {
        let table = RowRuleTable::new()
            .with(RowRule::new(1, row(2) + 1.0))
            .with(RowRule::new(2, row(1) + 1.0))
            .with(RowRule::new(3, RowFormula::constant(7.0)));
        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        let computed = model.compute_all(2);
        assert!(computed[&1].iter().all(|v| v.is_nan()));
        assert!(computed[&2].iter().all(|v| v.is_nan()));
        assert_eq!(computed[&3], vec![7.0, 7.0]);
    }

    #[test]
    fn test_external_seed_overrides_rule_seed() {
        let table = RowRuleTable::new().with(RowRule::new(
            18,
            RowFormula::recurrence(Seed::Literal(30000.0), Step::Add(-10.5)),
        ));
        let model = OfflineModel::new(base(), &table, FixedSeeds(100.0), HashMap::new());
        assert_eq!(model.compute_row(18, &ComputedRows::new(), 3), vec![100.0, 89.5, 79.0]);

        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        assert_eq!(model.compute_row(18, &ComputedRows::new(), 2), vec![30000.0, 29989.5]);
    }

    #[test]
    fn test_values_grid_keeps_blanks() {
        let table = RowRuleTable::new().with(RowRule::new(
            19,
            RowFormula::recurrence(Seed::Literal(0.0), Step::BlankAfterSeed),
        ));
        let model = OfflineModel::new(base(), &table, RuleSeeds, HashMap::new());
        let computed = model.compute_all(3);
        let grid = model.values_grid(&computed, ColumnMapper::default(), 3);
        assert_eq!(grid.value(19, 1), Some(0.0));
        assert!(grid.get(19, 2).unwrap().content.is_blank());
    }
}
