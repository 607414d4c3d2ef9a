//! The row catalogue of the sukuk leverage model.
//!
//! Branches are listed in precedence order; the first matching predicate
//! wins, and the formula passed to `RowRule::new` is the fallback.

use crate::engine::{CellAddr, Expr, RowFormula, RowRule, RowRuleTable, Seed, Step, row};
use crate::model::layout::anchor_value;
use crate::model::{Leverage, Scenario, TaxShield};

/// Recurrence seeded from a fixed anchor cell. The seed is absent if the
/// anchor is not part of the layout.
fn anchored(col: usize, row: u32, step: Step) -> RowFormula {
    let addr = CellAddr::new(col, row);
    RowFormula::Recurrence {
        seed: anchor_value(addr).map(|value| Seed::Anchor { addr, value }),
        step,
    }
}

fn ratio(numerator: u32) -> Expr {
    row(numerator) / row(21) * 100.0
}

fn wacc(ks: u32, ke: u32) -> Expr {
    (row(30) * row(39)).group() + (row(ks) * row(40)).group() + (row(ke) * row(41)).group()
}

fn is_rts(s: &Scenario) -> bool {
    s.shield == TaxShield::Rent
}

fn is_dts_zl(s: &Scenario) -> bool {
    s.shield == TaxShield::Dividend && s.leverage == Leverage::ZeroDebt
}

/// Build the full rule table.
pub fn sukuk_rules() -> RowRuleTable {
    let income = [
        RowRule::new(4, RowFormula::linear(10000.0, 52000.0)),
        RowRule::new(5, row(19) * row(24)),
        RowRule::new(6, row(20) * row(25)).when(
            "alt-rent",
            |s| s.flags().rent_uses_alt_rent_row,
            row(20) * row(31),
        ),
        RowRule::new(7, row(20) * row(26)),
        RowRule::new(8, row(20) * row(27)),
        RowRule::new(9, (row(4) - row(5) - row(6) - row(7)).group() * row(28))
            .when("no-dividend", |s| s.flags().no_dividend_before_tax, RowFormula::Blank)
            .when(
                "dts",
                |s| s.flags().dts_dividend_formula,
                (row(4) - row(7) + row(8) - row(13) - row(14)).group() * row(28),
            )
            .when(
                "dts-rts",
                |s| s.flags().dts_rts_dividend_formula,
                (row(4) - row(6) - row(7) + row(8) - row(13)).group() * row(29),
            ),
        RowRule::new(10, row(4) - row(5) - row(6) - row(7) + row(8) - row(9)),
        RowRule::new(11, row(10) * row(22)),
        RowRule::new(12, row(10) - row(11)),
        RowRule::new(13, row(19) * row(30)).when(
            "interest-before-tax",
            |s| s.flags().interest_before_tax,
            RowFormula::Blank,
        ),
        RowRule::new(14, row(31) * row(20)).when("rts", is_rts, RowFormula::Blank),
        RowRule::new(15, row(12) - row(13) - row(14))
            .when("dts-rts", |s| s.flags().dts_rts_dividend_formula, RowFormula::Blank)
            .when("dts-zl", is_dts_zl, row(12) - row(13) - row(14) + row(9)),
        RowRule::new(16, row(15) * row(29)),
        RowRule::new(17, row(12) + row(7)),
    ];

    let capital = [
        RowRule::new(18, RowFormula::recurrence(Seed::Literal(30000.0), Step::Add(-10.5))),
        RowRule::new(19, RowFormula::recurrence(Seed::Literal(40000.0), Step::Add(-40.0))).when(
            "zero-debt",
            |s| s.flags().zero_debt,
            RowFormula::recurrence(Seed::Literal(0.0), Step::BlankAfterSeed),
        ),
        RowRule::new(20, RowFormula::recurrence(Seed::Literal(0.0), Step::Add(50.5))).when(
            "zero-debt",
            |s| s.flags().zero_debt,
            RowFormula::recurrence(Seed::Literal(40000.0), Step::Add(10.5)),
        ),
        RowRule::new(21, row(18) + row(19) + row(20)),
        RowRule::new(22, RowFormula::constant(0.35)),
        RowRule::new(23, (Expr::Num(1.0) - row(22)).group()),
        RowRule::new(24, RowFormula::constant(0.0)),
        RowRule::new(25, RowFormula::constant(0.0)),
        RowRule::new(26, RowFormula::constant(0.025)),
        RowRule::new(27, RowFormula::constant(0.03)),
        RowRule::new(28, anchored(6, 28, Step::Carry)),
        RowRule::new(29, crate::engine::anchor(5, 28)),
    ];

    let cost_of_capital = [
        RowRule::new(30, anchored(5, 24, Step::Carry)),
        RowRule::new(31, RowFormula::linear(0.02, 0.44)),
        RowRule::new(33, row(16) / row(18)),
        RowRule::new(34, wacc(31, 33))
            .when("dts-rts", |s| s.flags().dts_rts_dividend_formula, wacc(36, 37))
            .when("rts", |s| s.flags().rent_before_tax, wacc(36, 33))
            .when("dts", |s| s.flags().dts_dividend_formula, wacc(31, 37)),
        RowRule::new(35, row(30) * row(23)),
        RowRule::new(36, row(31) * row(23)),
        RowRule::new(37, row(33) * row(23)),
        RowRule::new(39, row(19) / row(21)),
        RowRule::new(40, row(20) / row(21)),
        RowRule::new(41, row(18) / row(21)),
        RowRule::new(42, row(34)),
    ];

    let valuation = [
        RowRule::new(43, row(17) / row(42)),
        RowRule::new(44, row(5) * row(22)),
        RowRule::new(45, row(22) * (row(6) + row(7))),
        RowRule::new(46, RowFormula::Blank).when(
            "dividend-before-tax",
            |s| s.dividend_before_tax(),
            row(9) * row(22),
        ),
        RowRule::new(47, row(22) * row(19)),
        RowRule::new(48, row(20) * row(22)),
        RowRule::new(49, RowFormula::Blank).when(
            "dividend-before-tax",
            |s| s.dividend_before_tax(),
            row(18) * row(22),
        ),
        RowRule::new(51, row(43) - row(47))
            .when(
                "dts-rts",
                |s| s.flags().dts_rts_dividend_formula,
                row(43) - row(47) + row(48) + row(49),
            )
            .when("rts", |s| s.flags().rent_before_tax, row(43) - row(47) + row(48))
            .when("dts", |s| s.flags().dts_dividend_formula, row(43) - row(47) + row(49)),
        RowRule::new(52, row(18) / 5.0),
        RowRule::new(53, row(16) / row(52)),
    ];

    let summary = [
        RowRule::new(74, row(43) / 32000.0),
        RowRule::new(75, row(11) / 1700.0),
        RowRule::new(76, row(75)),
        RowRule::new(114, ratio(18)),
        RowRule::new(115, ratio(19)),
        RowRule::new(116, ratio(20)),
        RowRule::new(117, row(114) + row(115) + row(116)),
        RowRule::new(119, row(114)),
        RowRule::new(120, row(115)),
        RowRule::new(121, row(116)),
        RowRule::new(122, row(117)),
    ];

    income
        .into_iter()
        .chain(capital)
        .chain(cost_of_capital)
        .chain(valuation)
        .chain(summary)
        .collect()
}
