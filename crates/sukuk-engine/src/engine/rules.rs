//! Row rules: how each row of a sheet is filled across the sweep.
//!
//! A [`RowRule`] is an ordered list of branches. Each branch pairs a scenario
//! predicate with a [`RowFormula`]; the first branch whose predicate holds is
//! the one used, and the last branch is always a catch-all default.

use std::collections::BTreeMap;

use super::cell_ref::CellAddr;
use super::expr::Expr;
use crate::model::Scenario;

/// Deterministic per-column values that read no other row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Schedule {
    /// `start` at column 1 to `end` at the last column, evenly spaced.
    Linear { start: f64, end: f64 },
    Constant(f64),
}

impl Schedule {
    /// Value at 1-based `column` out of `columns`.
    pub fn value(&self, column: usize, columns: usize) -> f64 {
        match *self {
            Schedule::Constant(v) => v,
            Schedule::Linear { start, end } => {
                if columns <= 1 {
                    return start;
                }
                start + (end - start) * (column - 1) as f64 / (columns - 1) as f64
            }
        }
    }
}

/// Column-1 value of a recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Seed {
    Literal(f64),
    /// Column 1 is a formula pointing at a fixed cell whose value is known.
    Anchor { addr: CellAddr, value: f64 },
}

impl Seed {
    pub fn value(&self) -> f64 {
        match *self {
            Seed::Literal(v) => v,
            Seed::Anchor { value, .. } => value,
        }
    }
}

/// How column `c` follows from column `c - 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Same value as the previous column.
    Carry,
    /// Previous column plus a fixed delta.
    Add(f64),
    /// Only column 1 is populated; later columns are explicitly empty.
    BlankAfterSeed,
}

impl Step {
    /// Next accumulator value, `None` when the column is blank.
    pub fn advance(&self, prev: f64) -> Option<f64> {
        match *self {
            Step::Carry => Some(prev),
            Step::Add(delta) => Some(prev + delta),
            Step::BlankAfterSeed => None,
        }
    }

    /// Formula body (no `=`) referencing the previous column's cell.
    pub fn render(&self, prev_column: &str, row: u32) -> Option<String> {
        let prev = format!("{}{}", prev_column, row);
        match *self {
            Step::Carry => Some(prev),
            Step::Add(delta) if delta < 0.0 => {
                Some(format!("{}-{}", prev, super::expr::format_number(-delta)))
            }
            Step::Add(delta) => Some(format!("{}+{}", prev, super::expr::format_number(delta))),
            Step::BlankAfterSeed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowFormula {
    Blank,
    Schedule(Schedule),
    /// Same-column template.
    Formula(Expr),
    /// First-order recurrence over the previous column.
    Recurrence { seed: Option<Seed>, step: Step },
}

impl RowFormula {
    pub fn linear(start: f64, end: f64) -> RowFormula {
        RowFormula::Schedule(Schedule::Linear { start, end })
    }

    pub fn constant(value: f64) -> RowFormula {
        RowFormula::Schedule(Schedule::Constant(value))
    }

    pub fn recurrence(seed: Seed, step: Step) -> RowFormula {
        RowFormula::Recurrence {
            seed: Some(seed),
            step,
        }
    }

    /// Same-column rows this formula reads.
    pub fn dependencies(&self) -> Vec<u32> {
        match self {
            RowFormula::Formula(expr) => expr.rows(),
            _ => Vec::new(),
        }
    }

    /// Whether `column` is explicitly empty under this formula.
    pub fn is_blank_at(&self, column: usize) -> bool {
        match self {
            RowFormula::Blank => true,
            RowFormula::Recurrence {
                step: Step::BlankAfterSeed,
                ..
            } => column > 1,
            _ => false,
        }
    }
}

impl From<Expr> for RowFormula {
    fn from(expr: Expr) -> Self {
        RowFormula::Formula(expr)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleKind {
    LiteralSchedule,
    Constant,
    Formula,
    Recurrence,
    ConditionalFormula,
    Blank,
}

pub type Predicate = fn(&Scenario) -> bool;

#[derive(Clone, Debug)]
pub struct Branch {
    /// Short name used in diagnostics ("dts", "default", ...).
    pub name: &'static str,
    pub when: Predicate,
    pub formula: RowFormula,
}

fn always(_: &Scenario) -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct RowRule {
    pub row: u32,
    branches: Vec<Branch>,
}

impl RowRule {
    /// A rule with only a default branch.
    pub fn new(row: u32, default: impl Into<RowFormula>) -> RowRule {
        RowRule {
            row,
            branches: vec![Branch {
                name: "default",
                when: always,
                formula: default.into(),
            }],
        }
    }

    /// Add a branch ahead of the default. Branches are tried in the order they
    /// were added.
    pub fn when(mut self, name: &'static str, when: Predicate, formula: impl Into<RowFormula>) -> RowRule {
        let at = self.branches.len() - 1;
        self.branches.insert(
            at,
            Branch {
                name,
                when,
                formula: formula.into(),
            },
        );
        self
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// First branch whose predicate holds. Always succeeds because the
    /// default branch matches everything.
    pub fn select(&self, scenario: &Scenario) -> &Branch {
        self.branches
            .iter()
            .find(|b| (b.when)(scenario))
            .unwrap_or_else(|| &self.branches[self.branches.len() - 1])
    }

    pub fn formula_for(&self, scenario: &Scenario) -> &RowFormula {
        &self.select(scenario).formula
    }

    pub fn kind(&self) -> RuleKind {
        if self.branches.len() > 1 {
            return RuleKind::ConditionalFormula;
        }
        match &self.branches[0].formula {
            RowFormula::Blank => RuleKind::Blank,
            RowFormula::Schedule(Schedule::Linear { .. }) => RuleKind::LiteralSchedule,
            RowFormula::Schedule(Schedule::Constant(_)) => RuleKind::Constant,
            RowFormula::Formula(_) => RuleKind::Formula,
            RowFormula::Recurrence { .. } => RuleKind::Recurrence,
        }
    }
}

/// Row number -> rule. Rows without a rule are gaps and render blank.
#[derive(Clone, Debug, Default)]
pub struct RowRuleTable {
    rules: BTreeMap<u32, RowRule>,
}

impl RowRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing any existing rule for the same row.
    pub fn insert(&mut self, rule: RowRule) -> Option<RowRule> {
        self.rules.insert(rule.row, rule)
    }

    pub fn with(mut self, rule: RowRule) -> Self {
        self.insert(rule);
        self
    }

    pub fn get(&self, row: u32) -> Option<&RowRule> {
        self.rules.get(&row)
    }

    /// Rules in ascending row order.
    pub fn iter(&self) -> impl Iterator<Item = &RowRule> {
        self.rules.values()
    }

    pub fn rows(&self) -> Vec<u32> {
        self.rules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<RowRule> for RowRuleTable {
    fn from_iter<I: IntoIterator<Item = RowRule>>(iter: I) -> Self {
        let mut table = RowRuleTable::new();
        for rule in iter {
            table.insert(rule);
        }
        table
    }
}
