//! Sheet assembly.
//!
//! Each scenario is built independently from the shared rule table, either
//! one after another or on the rayon pool. Sheets come back in the order the
//! scenarios were given; a scenario that fails is reported and left out.

use rayon::prelude::*;
use sukuk_engine::engine::{
    ColumnMapper, OfflineModel, RowRuleTable, SeedSource, build_grid, find_row_cycle,
};
use sukuk_engine::model::layout::{anchor_values, hidden_rows, sheet_metadata};
use sukuk_engine::model::{Scenario, sukuk_rules};
use tracing::{debug, error};

use super::{Sheet, Workbook};
use crate::config::{Mode, SukukConfig};
use crate::error::{Result, SukukError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssembleOptions {
    pub columns: usize,
    pub mapper: ColumnMapper,
    pub mode: Mode,
    pub parallel: bool,
    pub hide_unused_rows: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        AssembleOptions::from(&SukukConfig::default())
    }
}

impl From<&SukukConfig> for AssembleOptions {
    fn from(config: &SukukConfig) -> Self {
        AssembleOptions {
            columns: config.iterations,
            mapper: config.mapper(),
            mode: config.mode,
            parallel: config.parallel,
            hide_unused_rows: config.hide_unused_rows,
        }
    }
}

/// Result of assembling a set of scenarios.
#[derive(Debug, Default)]
pub struct Assembly {
    pub workbook: Workbook,
    pub failures: Vec<(Scenario, SukukError)>,
}

impl Assembly {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build one scenario's sheet.
pub fn build_sheet<S: SeedSource>(
    scenario: Scenario,
    table: &RowRuleTable,
    options: &AssembleOptions,
    seeds: S,
) -> Result<Sheet> {
    let grid = match options.mode {
        Mode::Formulas => {
            let grid = build_grid(&scenario, table, options.mapper, options.columns)?;
            if let Some(cycle) = find_row_cycle(&grid) {
                return Err(SukukError::Cycle {
                    scenario: scenario.name(),
                    column: cycle.column,
                    path: cycle.path,
                });
            }
            grid
        }
        Mode::Values => {
            let model = OfflineModel::new(scenario, table, seeds, anchor_values());
            let computed = model.compute_all(options.columns);
            let nan_rows = computed
                .values()
                .filter(|values| values.iter().any(|v| v.is_nan()))
                .count();
            if nan_rows > 0 {
                debug!("{}: {} rows contain NaN", scenario, nan_rows);
            }
            model.values_grid(&computed, options.mapper, options.columns)
        }
    };

    let hidden = if options.hide_unused_rows {
        hidden_rows()
    } else {
        Vec::new()
    };

    Ok(Sheet {
        scenario,
        metadata: sheet_metadata(&scenario, options.mapper, options.columns),
        hidden_rows: hidden,
        grid,
    })
}

fn build_logged<S: SeedSource>(
    scenario: Scenario,
    table: &RowRuleTable,
    options: &AssembleOptions,
    seeds: S,
) -> Result<Sheet> {
    debug!("Building {} ({} columns, {})", scenario, options.columns, options.mode);
    let result = build_sheet(scenario, table, options, seeds);
    match &result {
        Ok(sheet) => debug!("Built {}: {} cells", scenario, sheet.grid.len()),
        Err(err) => error!("Aborted {}: {}", scenario, err),
    }
    result
}

/// Assemble a workbook from `scenarios`, preserving their order.
pub fn assemble<S: SeedSource + Sync>(
    scenarios: &[Scenario],
    options: &AssembleOptions,
    seeds: &S,
) -> Assembly {
    let table = sukuk_rules();

    let results: Vec<Result<Sheet>> = if options.parallel {
        scenarios
            .par_iter()
            .map(|&scenario| build_logged(scenario, &table, options, seeds))
            .collect()
    } else {
        scenarios
            .iter()
            .map(|&scenario| build_logged(scenario, &table, options, seeds))
            .collect()
    };

    let mut sheets = Vec::with_capacity(scenarios.len());
    let mut failures = Vec::new();
    for (&scenario, result) in scenarios.iter().zip(results) {
        match result {
            Ok(sheet) => sheets.push(sheet),
            Err(err) => failures.push((scenario, err)),
        }
    }

    Assembly {
        workbook: Workbook::new(sheets),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukuk_engine::engine::{CellContent, RowFormula, RowRule, RuleSeeds, Step};
    use sukuk_engine::model::all_scenarios;

    fn options(columns: usize) -> AssembleOptions {
        AssembleOptions {
            columns,
            ..AssembleOptions::default()
        }
    }

    #[test]
    fn test_assemble_all_in_registry_order() {
        let scenarios = all_scenarios();
        let assembly = assemble(&scenarios, &options(5), &RuleSeeds);
        assert!(assembly.is_complete());
        let names: Vec<String> = assembly.workbook.sheets().iter().map(Sheet::name).collect();
        let expected: Vec<String> = scenarios.iter().map(Scenario::name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scenarios = all_scenarios();
        let sequential = assemble(&scenarios, &options(8), &RuleSeeds);
        let parallel = assemble(
            &scenarios,
            &AssembleOptions {
                parallel: true,
                ..options(8)
            },
            &RuleSeeds,
        );
        for (a, b) in sequential.workbook.sheets().iter().zip(parallel.workbook.sheets()) {
            assert_eq!(a.scenario, b.scenario);
            assert_eq!(
                a.grid.iter().collect::<Vec<_>>(),
                b.grid.iter().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_values_mode_has_no_formulas() {
        let scenario = Scenario::from_name("NTS-L").unwrap();
        let sheet = build_sheet(
            scenario,
            &sukuk_rules(),
            &AssembleOptions {
                mode: Mode::Values,
                ..options(4)
            },
            RuleSeeds,
        )
        .unwrap();
        assert!(sheet.grid.iter().all(|c| c.formula().is_none()));
        assert_eq!(sheet.grid.value(18, 2), Some(29989.5));
    }

    #[test]
    fn test_missing_seed_is_reported_not_fatal() {
        let scenario = Scenario::from_name("NTS-L").unwrap();
        let table = RowRuleTable::new().with(RowRule::new(
            18,
            RowFormula::Recurrence {
                seed: None,
                step: Step::Carry,
            },
        ));
        let err = build_sheet(scenario, &table, &options(3), RuleSeeds).unwrap_err();
        assert!(matches!(err, SukukError::Build(_)));
    }

    #[test]
    fn test_hidden_rows_optional() {
        let scenario = Scenario::from_name("RTS-ZL").unwrap();
        let shown = build_sheet(
            scenario,
            &sukuk_rules(),
            &AssembleOptions {
                hide_unused_rows: false,
                ..options(2)
            },
            RuleSeeds,
        )
        .unwrap();
        assert!(shown.hidden_rows.is_empty());

        let hidden = build_sheet(scenario, &sukuk_rules(), &options(2), RuleSeeds).unwrap();
        assert!(hidden.hidden_rows.iter().any(|h| h.row == 54));
        assert!(matches!(
            hidden.metadata[0].content,
            CellContent::Text(ref t) if t == "RENTAL TAX SHIELD WITH ZERO DEBT"
        ));
    }
}
