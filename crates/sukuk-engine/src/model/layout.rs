//! Sheet layout: labels, anchor constants and presentation metadata that live
//! outside the iteration columns.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::engine::{CellAddr, CellContent, ColumnMapper};
use crate::model::Scenario;

const COL_A: usize = 1;
const COL_C: usize = 3;
const COL_D: usize = 4;
const COL_E: usize = 5;
const COL_F: usize = 6;
const COL_G: usize = 7;
const COL_H: usize = 8;

/// Row of the `A1..AN` iteration header.
pub const HEADER_ROW: u32 = 3;

/// Unused row ranges, grouped (outline level 1) and collapsed.
pub const COLLAPSED_ROWS: [RangeInclusive<u32>; 2] = [54..=73, 78..=113];

/// Single spacer rows hidden without grouping.
pub const HIDDEN_SPACERS: [u32; 2] = [77, 118];

/// Constants referenced by column-1 formulas, e.g. `=F28`, `=E24`.
const ANCHORS: &[(usize, u32, f64)] = &[
    (COL_F, 19, 28000.0),
    (COL_E, 20, 0.0),
    (COL_F, 20, 2000.0),
    (COL_E, 21, 42000.0),
    (COL_F, 21, 2000.0),
    (COL_E, 22, 0.35),
    (COL_F, 22, 0.35),
    (COL_E, 24, 0.1),
    (COL_F, 24, 0.0),
    (COL_E, 25, 0.1),
    (COL_F, 25, 0.0),
    (COL_E, 26, 0.03),
    (COL_F, 26, 0.025),
    (COL_E, 27, 0.03),
    (COL_F, 27, 0.03),
    (COL_E, 28, 0.5),
    (COL_F, 28, 0.0),
];

const ANCHOR_CAPTIONS: &[(usize, u32, &str)] = &[
    (COL_D, 19, "Equity"),
    (COL_D, 20, "Debt"),
    (COL_D, 21, "Sukuk"),
    (COL_D, 22, "TAX RATE"),
    (COL_D, 24, "INTEREST rate that is tax deductible"),
    (COL_D, 25, "RENT rate that is tax deductible"),
    (COL_D, 26, "NDTS rate that is tax deductible"),
    (COL_D, 27, "Capital gain or loss that is tax deductible"),
    (COL_D, 28, "DIVIDEND rate that is tax deductible"),
    (COL_C, 30, "Ki"),
    (COL_C, 31, "Ks"),
    (COL_C, 33, "Ke"),
];

/// Labels for columns A, G and H. `{s}` is replaced by the scenario name and
/// `{l}` by its leverage code.
type Labels = (u32, Option<&'static str>, Option<&'static str>, Option<&'static str>);

const LABELS: &[Labels] = &[
    (4, Some("Net Operating Income"), None, Some("NOI")),
    (
        5,
        Some("Interest of Debt (market value of debt*interest rate)"),
        Some("INTEREST ON DEBT"),
        Some("INTEREST"),
    ),
    (
        6,
        Some("Rent of Sukuk ijarah assets (market value of sukuk*rent rate)"),
        Some("RENT ON SUKUK"),
        Some("RENT"),
    ),
    (
        7,
        Some("Benefit of asset depreciation/running expenses of the ijarah asset"),
        None,
        Some("NDTS"),
    ),
    (8, Some("CAPITAL GAIN OR LOSS"), Some("CAPITAL GAIN OR LOSS"), Some("CAPITAL GAIN OR LOSS")),
    (9, Some("Dividend paid (tax shield)"), Some("DIVIDEND ON TAX"), Some("Dividend")),
    (10, Some("Earnings before Tax with above calculation"), None, Some("EBT")),
    (11, Some("TAX.C-{s}"), Some("TAX AMOUNT Tax @ 35%"), Some("TAX.C-{s}")),
    (12, Some("EAT"), None, Some("EAT")),
    (
        13,
        Some("EARNING AVAILABLE FOR DEBTHOLDERS"),
        Some("EARNING AVAILABLE FOR DEBTHOLDERS"),
        Some("INTEREST IF AFTER TAX"),
    ),
    (
        14,
        Some("EARNING AVAILABLE FOR SUKUK HOLDERS"),
        Some("EARNING AVAILABLE FOR SUKUK HOLDERS"),
        Some("RENT IF AFTER TAX"),
    ),
    (
        15,
        Some("EARNING AVAILABLE FOR SHAREHOLDERS"),
        Some("EARNING AVAILABLE FOR SHAREHOLDERS"),
        Some("DIVIDEND IF AFTER TAX"),
    ),
    (16, Some("Dividend PAID"), Some("Dividend PAID"), Some("DIVIDEND IF AFTER TAX")),
    (17, Some("NOI APPROACH"), Some("NOI APPROACH"), Some("NOI APPROACH")),
    (18, Some("Share Capital"), None, Some("EQUITY")),
    (19, Some("Market value of debt"), Some("TOTAL DEBT"), Some("DEBT")),
    (20, Some("Market value of sukuk"), Some("TOTAL SUKUK"), Some("SUKUK")),
    (21, Some("Total Assets"), Some("TOTAL ASSETS"), Some("Total Assets")),
    (22, Some("Tax rate"), Some("TAX RATE"), Some("Tax rate")),
    (23, Some("TAX SHIELD (1-Tr) or (1-35%)"), None, Some("TAX SHIELD (1-Tr) or (1-35%)")),
    (24, Some("Interest rate"), Some("ki"), Some("Interest rate")),
    (25, Some("ijarah sukuk rent rate"), Some("ks"), Some("ijarah sukuk rent rate")),
    (
        26,
        Some("ijarah depreciation benefit/or daily running expenses"),
        Some("NDTS RATE"),
        Some("ijarah depreciation benefit/or daily running expenses"),
    ),
    (
        27,
        Some("In case of purchase back asset from sukuk holder"),
        Some("CAPITAL GAIN OR LOSS"),
        Some("In case of purchase back asset from sukuk holder"),
    ),
    (28, Some("dividend rate"), Some("DIVIDEND RATE"), Some("dividend rate")),
    (29, None, Some("DIVIDEND RATE"), None),
    (30, Some("ki -{s}"), Some("Ki"), Some("ki -{s}")),
    (31, Some("ks -{s}"), Some("Ks"), Some("ks -{s}")),
    (32, None, None, Some("ks+g")),
    (33, Some("ke -{s}"), Some("Ke"), Some("ke -{s}")),
    (34, Some("ko"), Some("ko"), Some("ko")),
    (35, Some("ki with tax shield"), Some("ki (1-Tr)"), Some("ki with tax shield")),
    (36, Some("ks with tax shield"), Some("ks (1-Tr)"), Some("ks with tax shield")),
    (37, Some("ke with tax shield"), Some("ke (1-Tr)"), Some("ke with tax shield")),
    (38, None, Some("ko"), None),
    (39, Some("DEBT-{l}"), Some("DEBT TO ASSETS"), Some("DEBT TO ASSETS")),
    (40, Some("SUKUK-{l}"), Some("SUKUK TO ASSETS"), Some("SUKUK TO ASSETS")),
    (41, Some("EQUITY-{l}"), Some("EQUITY TO ASSETS"), Some("EQUITY TO ASSETS")),
    (42, Some("WACC -{s}"), Some("WACC"), Some("WACC -{s}")),
    (43, None, Some("Market Value of Firm (MVF)"), None),
    (
        44,
        Some("Annual TAX SHIELD benefits of debt"),
        Some("Annual TAX SHIELD benefits of debt"),
        Some("Annual TAX SHIELD benefits of debt"),
    ),
    (
        45,
        Some("Annual RENT SHIELD benefits of sukuk"),
        Some("Annual RENT SHIELD benefits of sukuk"),
        Some("Annual RENT SHIELD benefits of sukuk"),
    ),
    (
        46,
        Some("Annual Dividend SHIELD benefits of Equity"),
        Some("Annual Dividend SHIELD benefits of Equity"),
        Some("Annual Dividend SHIELD benefits of Equity"),
    ),
    (
        47,
        Some("PV of TAX SHIELD benefits of debt"),
        Some("PV of INTEREST TAX SHIELD benefits of debt"),
        Some("PV of TAX SHIELD benefits of debt"),
    ),
    (
        48,
        Some("PV of RENT SHIELD benefits of sukuk"),
        Some("PV of RENTAL TAX SHIELD benefits of sukuk"),
        Some("PV of RENT SHIELD benefits of sukuk"),
    ),
    (
        49,
        Some("PV of Dividend SHIELD benefits of Equity"),
        Some("PV of Dividend TAX SHIELD benefits of Equity"),
        Some("PV of Dividend SHIELD benefits of Equity"),
    ),
    (50, Some("PV of Bankruptcy Cost"), Some("PV of Bankruptcy Cost"), Some("PV of Bankruptcy Cost")),
    (51, Some("MVF-{s}"), Some("MVF + Present Value of Tax Shield/Bc"), Some("MVF-{s}")),
    (
        52,
        Some("No. of Shares Outstanding"),
        Some("NO OF SHARES OUTSTANDING"),
        Some("No. of Shares Outstanding"),
    ),
    (53, Some("EPS-{s}"), Some("EARNING PER SHARE"), Some("EPS-{s}")),
    (74, Some("MVF (Scaled Value)"), Some("MVF (Scaled Value)"), Some("MVF (Scaled Value)")),
    (
        75,
        Some("Tax Contribution Scaled"),
        Some("Tax Contribution Scaled"),
        Some("Tax Contribution Scaled"),
    ),
    (76, Some("T.C"), Some("T.C"), Some("T.C")),
    (114, Some("Share Capital"), Some("SHARE CAPITAL"), Some("Equity %")),
    (115, Some("Market value of debt"), Some("TOTAL DEBT"), Some("Debt %")),
    (116, Some("Market value of sukuk"), Some("TOTAL SUKUK"), Some("Sukuk %")),
    (117, Some("Total Assets"), Some("TOTAL ASSETS"), Some("Total Assets %")),
    (119, Some("Share Capital"), Some("SHARE CAPITAL"), Some("Equity %")),
    (120, Some("Market value of debt"), Some("TOTAL DEBT"), Some("Debt %")),
    (121, Some("Market value of sukuk"), Some("TOTAL SUKUK"), Some("Sukuk %")),
    (122, Some("Total Assets"), Some("TOTAL ASSETS"), Some("Total Assets %")),
];

/// A fixed cell outside the iteration area.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaCell {
    pub addr: CellAddr,
    pub content: CellContent,
}

impl MetaCell {
    fn text(col: usize, row: u32, text: impl Into<String>) -> MetaCell {
        MetaCell {
            addr: CellAddr::new(col, row),
            content: CellContent::Text(text.into()),
        }
    }
}

/// How a hidden row is presented.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HiddenRow {
    pub row: u32,
    pub outline_level: u8,
}

/// Value of an anchor cell, if the layout defines it.
pub fn anchor_value(addr: CellAddr) -> Option<f64> {
    ANCHORS
        .iter()
        .find(|(col, row, _)| *col == addr.col && *row == addr.row)
        .map(|(_, _, v)| *v)
}

pub fn anchor_values() -> HashMap<CellAddr, f64> {
    ANCHORS
        .iter()
        .map(|&(col, row, v)| (CellAddr::new(col, row), v))
        .collect()
}

/// Label text for `row` in columns A, G and H.
pub fn row_labels(row: u32, scenario: &Scenario) -> [Option<String>; 3] {
    let Some((_, a, g, h)) = LABELS.iter().find(|l| l.0 == row) else {
        return [None, None, None];
    };
    let name = scenario.name();
    let render = |label: &Option<&str>| {
        label.map(|t| t.replace("{s}", &name).replace("{l}", scenario.leverage_code()))
    };
    [render(a), render(g), render(h)]
}

/// Every metadata cell of a sheet: title, iteration header, row labels,
/// anchor table.
pub fn sheet_metadata(scenario: &Scenario, mapper: ColumnMapper, columns: usize) -> Vec<MetaCell> {
    let mut cells = vec![MetaCell::text(COL_H, 1, scenario.title())];

    cells.extend(
        (1..=columns).map(|c| MetaCell::text(mapper.sheet_column(c), HEADER_ROW, format!("A{}", c))),
    );

    for &(row, ..) in LABELS {
        let [a, g, h] = row_labels(row, scenario);
        for (col, label) in [(COL_A, a), (COL_G, g), (COL_H, h)] {
            if let Some(label) = label {
                cells.push(MetaCell::text(col, row, label));
            }
        }
    }

    cells.extend(
        ANCHOR_CAPTIONS
            .iter()
            .map(|&(col, row, text)| MetaCell::text(col, row, text)),
    );
    cells.extend(ANCHORS.iter().map(|&(col, row, v)| MetaCell {
        addr: CellAddr::new(col, row),
        content: CellContent::Number(v),
    }));

    cells
}

/// Rows to hide, in ascending order.
pub fn hidden_rows() -> Vec<HiddenRow> {
    let mut rows: Vec<HiddenRow> = COLLAPSED_ROWS
        .iter()
        .flat_map(|r| r.clone())
        .map(|row| HiddenRow { row, outline_level: 1 })
        .chain(HIDDEN_SPACERS.iter().map(|&row| HiddenRow { row, outline_level: 0 }))
        .collect();
    rows.sort_by_key(|r| r.row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Leverage, TaxShield};

    #[test]
    fn test_labels_substitute_scenario() {
        let s = Scenario::new(TaxShield::Dividend, Leverage::ZeroDebt);
        let [a, g, h] = row_labels(11, &s);
        assert_eq!(a.as_deref(), Some("TAX.C-DTS-ZL"));
        assert_eq!(g.as_deref(), Some("TAX AMOUNT Tax @ 35%"));
        assert_eq!(h.as_deref(), Some("TAX.C-DTS-ZL"));
        assert_eq!(row_labels(39, &s)[0].as_deref(), Some("DEBT-ZL"));
        assert_eq!(row_labels(2, &s), [None, None, None]);
    }

    #[test]
    fn test_anchor_lookup() {
        assert_eq!(anchor_value(CellAddr::new(COL_E, 28)), Some(0.5));
        assert_eq!(anchor_value(CellAddr::new(COL_F, 28)), Some(0.0));
        assert_eq!(anchor_value(CellAddr::new(COL_E, 24)), Some(0.1));
        assert_eq!(anchor_value(CellAddr::new(COL_E, 99)), None);
    }

    #[test]
    fn test_metadata_header_and_title() {
        let s = Scenario::new(TaxShield::None, Leverage::Leveraged);
        let meta = sheet_metadata(&s, ColumnMapper::default(), 3);
        let at = |addr: &str| {
            let addr: CellAddr = addr.parse().unwrap();
            meta.iter().find(|m| m.addr == addr).map(|m| m.content.clone())
        };
        assert_eq!(at("H1"), Some(CellContent::Text("NO TAX SHIELD WITH LEVERAGE".into())));
        assert_eq!(at("I3"), Some(CellContent::Text("A1".into())));
        assert_eq!(at("K3"), Some(CellContent::Text("A3".into())));
        assert_eq!(at("A42"), Some(CellContent::Text("WACC -NTS-L".into())));
        assert_eq!(at("F19"), Some(CellContent::Number(28000.0)));
    }

    #[test]
    fn test_hidden_rows() {
        let rows = hidden_rows();
        assert_eq!(rows.len(), 20 + 36 + 2);
        assert_eq!(rows.first().map(|r| r.row), Some(54));
        assert!(rows.iter().any(|r| r.row == 77 && r.outline_level == 0));
        assert!(rows.iter().any(|r| r.row == 113 && r.outline_level == 1));
        assert!(!rows.iter().any(|r| r.row == 74));
    }
}
