use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::table::{bool_cell, Row, Table, TableError};
use crate::utils::format_number;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to open workbook {path}: {msg}")]
    WorkbookOpen { path: PathBuf, msg: String },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Workbook has no sheets: {0}")]
    NoSheets(PathBuf),

    #[error("Header row {row} not found in sheet {sheet}")]
    MissingHeaderRow { sheet: String, row: usize },

    #[error("Invalid data in {file}: {msg}")]
    InvalidData { file: String, msg: String },

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads worksheets of an Excel workbook into `Table`s
pub struct SheetReader {
    workbook_path: PathBuf,
}

impl SheetReader {
    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.workbook_path
    }

    fn open(&self) -> Result<Sheets<BufReader<File>>, SheetError> {
        open_workbook_auto(&self.workbook_path).map_err(|e| SheetError::WorkbookOpen {
            path: self.workbook_path.clone(),
            msg: e.to_string(),
        })
    }

    /// Read a named sheet; `header_row` is the 0-based sheet row holding column names
    pub fn read_sheet(&self, sheet_name: &str, header_row: usize) -> Result<Table, SheetError> {
        info!(
            "Reading sheet '{}' from {}",
            sheet_name,
            self.workbook_path.display()
        );
        let mut workbook = self.open()?;
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|_| SheetError::SheetNotFound(sheet_name.to_string()))?;
        range_to_table(&range, sheet_name, header_row)
    }

    /// Read the first sheet of the workbook
    pub fn read_first_sheet(&self, header_row: usize) -> Result<Table, SheetError> {
        let mut workbook = self.open()?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetError::NoSheets(self.workbook_path.clone()))?;
        info!(
            "Reading first sheet '{}' from {}",
            sheet_name,
            self.workbook_path.display()
        );
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|_| SheetError::SheetNotFound(sheet_name.clone()))?;
        range_to_table(&range, &sheet_name, header_row)
    }
}

/// Convert a worksheet range to a table, skipping blank rows below the header
pub fn range_to_table(
    range: &Range<Data>,
    sheet_name: &str,
    header_row: usize,
) -> Result<Table, SheetError> {
    // Ranges start at the first used cell, not at A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = header_row.saturating_sub(first_row);

    let mut rows = range.rows().skip(skip);
    let header = rows.next().ok_or_else(|| SheetError::MissingHeaderRow {
        sheet: sheet_name.to_string(),
        row: header_row,
    })?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            cell_to_string(cell)
                .map(|name| normalize_header(&name))
                .unwrap_or_else(|| format!("Unnamed: {i}"))
        })
        .collect();

    let mut table = Table::new(columns);
    for cells in rows {
        let row: Row = cells.iter().map(cell_to_string).collect();
        if row.iter().all(Option::is_none) {
            continue;
        }
        table.push_row(row);
    }

    debug!(
        "Sheet '{}': {} columns, {} rows",
        sheet_name,
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

/// Collapse runs of whitespace (including line breaks) to single spaces
pub fn normalize_header(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of a cell, or `None` for empty and error cells
///
/// Time-only values (day fraction below one) are written `HH:MM:SS`,
/// midnight timestamps as a plain date.
pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_number(*f)),
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Bool(b) => Some(bool_cell(*b)),
        Data::DateTime(dt) => {
            let value = dt.as_datetime()?;
            if dt.as_f64() < 1.0 {
                Some(value.format("%H:%M:%S").to_string())
            } else if value.time() == chrono::NaiveTime::MIN {
                Some(value.format("%Y-%m-%d").to_string())
            } else {
                Some(value.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) | Data::Empty => None,
    }
}

/// Files in `dir` whose names satisfy `predicate`, sorted by name
pub fn matching_files<F>(dir: &Path, predicate: F) -> Result<Vec<PathBuf>, SheetError>
where
    F: Fn(&str) -> bool,
{
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(&predicate)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Filter \nSample #"), "Filter Sample #");
        assert_eq!(normalize_header("  Oxygen Bottle #"), "Oxygen Bottle #");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_to_string(&Data::Float(33.5)), Some("33.5".to_string()));
        assert_eq!(cell_to_string(&Data::Int(12)), Some("12".to_string()));
        assert_eq!(cell_to_string(&Data::String("  ".to_string())), None);
        assert_eq!(cell_to_string(&Data::Bool(true)), Some("True".to_string()));
        assert_eq!(cell_to_string(&Data::Empty), None);
    }

    #[test]
    fn test_range_to_table_header_row() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Carbon sample data".to_string()));
        range.set_value((1, 0), Data::String("CRUISE_ID".to_string()));
        range.set_value((1, 1), Data::String("CAST_NO".to_string()));
        range.set_value((2, 0), Data::String("AR18-A".to_string()));
        range.set_value((2, 1), Data::Float(4.0));

        let table = range_to_table(&range, "DIC", 1).unwrap();
        assert_eq!(table.columns(), &["CRUISE_ID", "CAST_NO"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "CAST_NO"), Some("4"));
    }

    #[test]
    fn test_range_to_table_unnamed_columns() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Station".to_string()));
        range.set_value((1, 0), Data::Int(7));
        range.set_value((1, 1), Data::String("x".to_string()));

        let table = range_to_table(&range, "Sheet1", 0).unwrap();
        assert_eq!(table.columns(), &["Station", "Unnamed: 1"]);
        assert_eq!(table.get(0, "Unnamed: 1"), Some("x"));
    }

    #[test]
    fn test_range_to_table_missing_header() {
        let range: Range<Data> = Range::new((0, 0), (0, 0));
        assert!(matches!(
            range_to_table(&range, "Summary", 5),
            Err(SheetError::MissingHeaderRow { .. })
        ));
    }

    #[test]
    fn test_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_oxy.xlsx", "a_oxy.xlsx", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let files = matching_files(dir.path(), |n| n.contains("oxy")).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a_oxy.xlsx", "b_oxy.xlsx"]);
    }
}
