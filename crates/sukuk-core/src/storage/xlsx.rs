//! XLSX export via rust_xlsxwriter.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook, Worksheet};
use sukuk_engine::engine::{CellAddr, CellContent, format_number};
use sukuk_engine::model::layout::HiddenRow;
use tracing::info;

use super::{SheetSink, SinkReport};
use crate::error::{Result, SukukError};
use crate::workbook::Workbook;

pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        XlsxSink {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Zero-based (row, col) for rust_xlsxwriter.
fn xlsx_pos(addr: CellAddr) -> Result<(u32, u16)> {
    let col = u16::try_from(addr.col.saturating_sub(1))
        .map_err(|_| SukukError::Config(format!("column of {} is out of range", addr)))?;
    Ok((addr.row.saturating_sub(1), col))
}

fn write_content(
    worksheet: &mut Worksheet,
    addr: CellAddr,
    content: &CellContent,
    format: Option<&Format>,
    report: &mut SinkReport,
) -> Result<()> {
    let (row, col) = xlsx_pos(addr)?;
    match content {
        CellContent::Blank => {}
        CellContent::Number(n) if n.is_nan() => {
            worksheet.write_formula(row, col, "=NA()")?;
            report.nan_cells += 1;
        }
        CellContent::Number(n) => {
            worksheet.write_number(row, col, *n)?;
            report.numbers += 1;
        }
        CellContent::Text(s) => {
            match format {
                Some(format) => worksheet.write_string_with_format(row, col, s, format)?,
                None => worksheet.write_string(row, col, s)?,
            };
            report.text += 1;
        }
        CellContent::Formula { text, value } => {
            let formula = match value {
                Some(v) => Formula::new(text).set_result(format_number(*v)),
                None => Formula::new(text),
            };
            worksheet.write_formula(row, col, formula)?;
            report.formulas += 1;
        }
    }
    Ok(())
}

/// Consecutive outline-level rows as inclusive zero-based ranges.
fn outline_groups(hidden: &[HiddenRow]) -> Vec<(u32, u32)> {
    let mut groups: Vec<(u32, u32)> = Vec::new();
    for h in hidden.iter().filter(|h| h.outline_level > 0) {
        let row = h.row.saturating_sub(1);
        match groups.last_mut() {
            Some((_, last)) if *last + 1 == row => *last = row,
            _ => groups.push((row, row)),
        }
    }
    groups
}

impl SheetSink for XlsxSink {
    fn write_workbook(&mut self, workbook: &Workbook) -> Result<SinkReport> {
        let mut report = SinkReport::default();
        let mut book = XlsxWorkbook::new();
        let title = Format::new().set_bold();

        for sheet in workbook.sheets() {
            let worksheet = book.add_worksheet();
            worksheet.set_name(sheet.name())?;

            for meta in &sheet.metadata {
                let format = (meta.addr.row == 1).then_some(&title);
                write_content(worksheet, meta.addr, &meta.content, format, &mut report)?;
            }
            for cell in sheet.grid.iter() {
                write_content(worksheet, sheet.grid.address(cell), &cell.content, None, &mut report)?;
            }

            for (first, last) in outline_groups(&sheet.hidden_rows) {
                worksheet.group_rows(first, last)?;
            }
            for hidden in &sheet.hidden_rows {
                worksheet.set_row_hidden(hidden.row.saturating_sub(1))?;
            }

            report.sheets += 1;
        }

        book.save(&self.path)?;
        report.files.push(self.path.clone());
        info!(
            "Wrote {} ({} sheets, {} formulas, {} numbers, {} NaN)",
            self.path.display(),
            report.sheets,
            report.formulas,
            report.numbers,
            report.nan_cells
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::workbook::{AssembleOptions, assemble};
    use calamine::{Data, Reader, open_workbook_auto};
    use std::io::Read;
    use sukuk_engine::engine::RuleSeeds;
    use sukuk_engine::model::all_scenarios;

    fn workbook(mode: Mode) -> Workbook {
        let options = AssembleOptions {
            columns: 3,
            mode,
            ..AssembleOptions::default()
        };
        assemble(&all_scenarios()[..2], &options, &RuleSeeds).workbook
    }

    #[test]
    fn test_outline_groups() {
        let hidden = [
            HiddenRow { row: 54, outline_level: 1 },
            HiddenRow { row: 55, outline_level: 1 },
            HiddenRow { row: 77, outline_level: 0 },
            HiddenRow { row: 78, outline_level: 1 },
        ];
        assert_eq!(outline_groups(&hidden), vec![(53, 54), (77, 77)]);
    }

    #[test]
    fn test_xlsx_round_trip_through_calamine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.xlsx");
        let report = XlsxSink::new(&path).write_workbook(&workbook(Mode::Formulas)).unwrap();
        assert_eq!(report.sheets, 2);
        assert!(report.formulas > 0);
        assert_eq!(report.nan_cells, 0);

        let mut book = open_workbook_auto(&path).unwrap();
        assert_eq!(book.sheet_names().to_vec(), vec!["NTS-L".to_string(), "ITS-L".to_string()]);

        let values = book.worksheet_range("NTS-L").unwrap();
        assert_eq!(values.get_value((3, 8)), Some(&Data::Float(10000.0)));
        assert_eq!(values.get_value((2, 9)), Some(&Data::String("A2".to_string())));

        let formulas = book.worksheet_formula("NTS-L").unwrap();
        assert_eq!(formulas.get_value((4, 8)).map(String::as_str), Some("I19*I24"));
        assert_eq!(formulas.get_value((17, 9)).map(String::as_str), Some("I18-10.5"));
    }

    #[test]
    fn test_unused_rows_are_grouped_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.xlsx");
        let workbook = workbook(Mode::Formulas);
        let nts = workbook.sheet("NTS-L").unwrap();
        assert!(nts.hidden_rows.iter().any(|h| h.row == 54 && h.outline_level == 1));
        XlsxSink::new(&path).write_workbook(&workbook).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();

        let row_tag = |row: u32| {
            let start = xml.find(&format!("<row r=\"{}\"", row)).unwrap();
            let end = start + xml[start..].find('>').unwrap();
            xml[start..end].to_string()
        };
        let grouped = row_tag(54);
        assert!(grouped.contains("hidden=\"1\""), "{}", grouped);
        assert!(grouped.contains("outlineLevel=\"1\""), "{}", grouped);
        let spacer = row_tag(77);
        assert!(spacer.contains("hidden=\"1\""), "{}", spacer);
        assert!(!spacer.contains("outlineLevel"), "{}", spacer);
    }

    #[test]
    fn test_values_mode_writes_nan_as_na() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.xlsx");
        let report = XlsxSink::new(&path).write_workbook(&workbook(Mode::Values)).unwrap();
        assert_eq!(report.formulas, 0);
        // Neither scenario divides by zero or reads an unmodelled row.
        assert_eq!(report.nan_cells, 0);
        assert!(path.exists());
    }
}
