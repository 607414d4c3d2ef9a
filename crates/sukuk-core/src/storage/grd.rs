//! Plain-text `.grd` dump, one file per sheet.

use std::fs;
use std::path::{Path, PathBuf};

use sukuk_engine::engine::{CellAddr, CellContent, format_number};
use tracing::info;

use super::{SheetSink, SinkReport};
use crate::error::Result;
use crate::workbook::{Sheet, Workbook};

pub struct GrdSink {
    base: PathBuf,
}

impl GrdSink {
    /// Files are named `<stem>-<sheet>.grd` beside `base`.
    pub fn new(base: impl AsRef<Path>) -> Self {
        GrdSink {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn sheet_path(&self, sheet: &Sheet) -> PathBuf {
        let stem = self
            .base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sukuk".to_string());
        self.base.with_file_name(format!("{}-{}.grd", stem, sheet.name()))
    }
}

impl SheetSink for GrdSink {
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<SinkReport> {
        let mut report = SinkReport::default();
        for sheet in workbook.sheets() {
            let path = self.sheet_path(sheet);
            let content = write_grd_content(sheet);
            for line in content.lines().skip(1) {
                let value = line.split_once(": ").map(|(_, v)| v).unwrap_or_default();
                if value == "=NA()" {
                    report.nan_cells += 1;
                } else if value.starts_with('=') {
                    report.formulas += 1;
                } else if value.starts_with('"') {
                    report.text += 1;
                } else {
                    report.numbers += 1;
                }
            }
            fs::write(&path, content)?;
            report.sheets += 1;
            report.files.push(path);
        }
        info!(
            "Wrote {} grd files ({} formulas, {} numbers)",
            report.sheets, report.formulas, report.numbers
        );
        Ok(report)
    }
}

/// Render a sheet as `.grd` text: metadata and iteration cells sorted by
/// row then column, blanks skipped.
pub fn write_grd_content(sheet: &Sheet) -> String {
    let mut cells: Vec<(CellAddr, &CellContent)> = sheet
        .metadata
        .iter()
        .map(|m| (m.addr, &m.content))
        .chain(sheet.grid.iter().map(|c| (sheet.grid.address(c), &c.content)))
        .collect();
    cells.sort_by(|a, b| a.0.row.cmp(&b.0.row).then(a.0.col.cmp(&b.0.col)));

    let mut lines = vec![format!("# Sukuk model: {}", sheet.name())];
    for (addr, content) in cells {
        let value_str = match content {
            CellContent::Blank => continue,
            CellContent::Number(n) if n.is_nan() => "=NA()".to_string(),
            CellContent::Number(n) => format_number(*n),
            CellContent::Text(s) => format!("\"{}\"", escape_grd_text(s)),
            CellContent::Formula { text, .. } => text.clone(),
        };
        lines.push(format!("{}: {}", addr, value_str));
    }

    lines.join("\n") + "\n"
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{AssembleOptions, build_sheet};
    use sukuk_engine::engine::RuleSeeds;
    use sukuk_engine::model::{Scenario, sukuk_rules};

    fn sheet(name: &str) -> Sheet {
        let options = AssembleOptions {
            columns: 3,
            ..AssembleOptions::default()
        };
        build_sheet(Scenario::from_name(name).unwrap(), &sukuk_rules(), &options, RuleSeeds).unwrap()
    }

    #[test]
    fn test_grd_content() {
        let content = write_grd_content(&sheet("NTS-L"));
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "# Sukuk model: NTS-L");
        assert!(lines.contains(&"I4: 10000"));
        assert!(lines.contains(&"K23: =(1-K22)"));
        assert!(lines.contains(&"J18: =I18-10.5"));
        assert!(lines.contains(&"I3: \"A1\""));
        assert!(lines.contains(&"F28: 0"));
    }

    #[test]
    fn test_grd_sorted_and_blanks_skipped() {
        let content = write_grd_content(&sheet("NTS-ZL"));
        assert!(content.contains("I19: 0\n"));
        assert!(!content.contains("J19:"));

        let rows: Vec<u32> = content
            .lines()
            .skip(1)
            .filter_map(|l| l.split_once(':'))
            .filter_map(|(addr, _)| addr.parse::<CellAddr>().ok())
            .map(|a| a.row)
            .collect();
        assert!(rows.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_grd_text(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn test_grd_sink_writes_one_file_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(vec![sheet("NTS-L"), sheet("(DTS+RTS)-ZL")]);
        let mut sink = GrdSink::new(dir.path().join("model.xlsx"));
        let report = sink.write_workbook(&workbook).unwrap();
        assert_eq!(report.sheets, 2);
        assert_eq!(report.files[0], dir.path().join("model-NTS-L.grd"));
        assert_eq!(report.files[1], dir.path().join("model-(DTS+RTS)-ZL.grd"));
        assert!(report.formulas > 0);
        let text = std::fs::read_to_string(&report.files[1]).unwrap();
        let combined = workbook.sheet("(DTS+RTS)-ZL").unwrap();
        assert_eq!(text, write_grd_content(combined));
        assert!(workbook.sheet("ITS-L").is_none());
    }
}
