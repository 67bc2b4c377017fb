use crate::error::{AttendanceError, Result};
use crate::types::{CellValue, Sheet};
use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub sheets: usize,
    pub total_rows: usize,
}

/// Every sheet of a workbook, read once and held read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Open a spreadsheet file, a single CSV export, or a directory of CSV
    /// exports (one file per sheet, named after the sheet).
    pub fn open(path: &Path) -> Result<(Self, LoadReport)> {
        let sheets = if path.is_dir() {
            load_csv_dir(path)?
        } else if has_csv_extension(path) {
            vec![load_csv_sheet(path)?]
        } else {
            let mut workbook = open_workbook_auto(path)?;
            read_sheets(&mut workbook)?
        };
        let workbook = Self { sheets };
        let report = workbook.report();
        log::info!(
            "Loaded {} sheets ({} rows) from {}",
            report.sheets,
            report.total_rows,
            path.display()
        );
        Ok((workbook, report))
    }

    /// Parse an uploaded xlsx payload.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<(Self, LoadReport)> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let workbook = Self {
            sheets: read_sheets(&mut workbook)?,
        };
        let report = workbook.report();
        log::info!("Loaded {} sheets from uploaded data", report.sheets);
        Ok((workbook, report))
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AttendanceError::SheetNotFound(name.to_string()))
    }

    pub fn quarter_names(&self, prefix: &str) -> Vec<String> {
        self.sheets
            .iter()
            .filter(|s| s.name.starts_with(prefix))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Team names listed on the roster sheet, in sheet order without
    /// duplicates. `None` when the sheet or its column is missing.
    pub fn roster_teams(&self, sheet: &str, column: &str, skip_rows: usize) -> Option<Vec<String>> {
        let sheet = self.sheets.iter().find(|s| s.name == sheet)?;
        let col = sheet.row(skip_rows).iter().position(|c| {
            c.as_label()
                .map(|l| l.eq_ignore_ascii_case(column))
                .unwrap_or(false)
        });
        let Some(col) = col else {
            log::warn!("Roster sheet '{}' has no '{}' column", sheet.name, column);
            return None;
        };

        let mut seen = HashSet::new();
        let teams = sheet
            .rows
            .iter()
            .skip(skip_rows + 1)
            .filter_map(|row| row.get(col).and_then(CellValue::as_label))
            .filter(|team| seen.insert(team.clone()))
            .collect();
        Some(teams)
    }

    fn report(&self) -> LoadReport {
        LoadReport {
            sheets: self.sheets.len(),
            total_rows: self.sheets.iter().map(|s| s.rows.len()).sum(),
        }
    }
}

fn read_sheets<RS, R>(workbook: &mut R) -> std::result::Result<Vec<Sheet>, <R as Reader<RS>>::Error>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        sheets.push(Sheet {
            name,
            rows: range_to_rows(&range),
        });
    }
    Ok(sheets)
}

// calamine trims leading empty rows/columns from the used range; pad them
// back so row and column numbers match the sheet.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row0 as usize];
    for r in range.rows() {
        let mut row = vec![CellValue::Empty; col0 as usize];
        row.extend(r.iter().map(cell_from_data));
        rows.push(row);
    }
    rows
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn cell_from_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn load_csv_sheet(path: &Path) -> Result<Sheet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(cell_from_field).collect());
    }
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Sheet { name, rows })
}

fn load_csv_dir(dir: &Path) -> Result<Vec<Sheet>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_csv_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|p| load_csv_sheet(p)).collect()
}
