// In-memory string tables
//
// Every source (bottle files, spreadsheets, CSV summaries) is loaded into a
// `Table` of optional string cells so that the merge steps can work on one
// representation. Missing cells are `None` until the sentinel fill at the end.

pub mod csv_io;
pub mod join;

use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

pub use join::JoinKeys;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Row = Vec<Option<String>>;

/// Column names plus rows of optional string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Append a row, padding with `None` or truncating to the column count
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }

    /// Add an all-`None` column if it does not exist yet; returns its index
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Replace (or create) a column with values derived from each row
    pub fn set_column_with<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&Table, usize) -> Option<String>,
    {
        let values: Vec<Option<String>> = (0..self.rows.len()).map(|i| f(&*self, i)).collect();
        let idx = self.ensure_column(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// Copy `source` into `target`, creating `target` if needed
    pub fn copy_column(&mut self, source: &str, target: &str) -> Result<(), TableError> {
        let src = self.require_column(source)?;
        let dst = self.ensure_column(target);
        for row in &mut self.rows {
            row[dst] = row[src].clone();
        }
        Ok(())
    }

    /// Rewrite every present cell of a column; returning `None` clears the cell
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), TableError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            if let Some(value) = row[idx].take() {
                row[idx] = f(&value);
            }
        }
        Ok(())
    }

    /// Fill missing cells of `target` from `source` in the same row
    pub fn fill_from(&mut self, target: &str, source: &str) -> Result<(), TableError> {
        let dst = self.require_column(target)?;
        let src = self.require_column(source)?;
        for row in &mut self.rows {
            if row[dst].is_none() {
                row[dst] = row[src].clone();
            }
        }
        Ok(())
    }

    /// Fill missing cells of one column with a constant
    pub fn fill_column(&mut self, name: &str, value: &str) -> Result<(), TableError> {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            if row[idx].is_none() {
                row[idx] = Some(value.to_string());
            }
        }
        Ok(())
    }

    /// Replace every missing cell with `value`
    pub fn fill_missing(&mut self, value: &str) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_none() {
                *cell = Some(value.to_string());
            }
        }
    }

    pub fn rename_columns<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for column in &mut self.columns {
            *column = f(column);
        }
    }

    /// Rename a column if present; returns whether it was found
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn prefix_columns(&mut self, prefix: &str) {
        self.rename_columns(|c| format!("{prefix}{c}"));
    }

    /// Drop the named columns; names that are not present are ignored
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();
        self.keep_indices(&keep);
    }

    fn keep_indices(&mut self, keep: &[usize]) {
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            let cells: Row = keep.iter().map(|&i| row[i].take()).collect();
            *row = cells;
        }
    }

    /// Project onto `names` in order; absent columns come back all `None`
    pub fn select(&self, names: &[&str]) -> Table {
        let indices: Vec<Option<usize>> = names
            .iter()
            .map(|name| {
                let idx = self.column_index(name);
                if idx.is_none() {
                    warn!("Column '{}' not present, filling with missing values", name);
                }
                idx
            })
            .collect();

        let mut table = Table::with_columns(names);
        for row in &self.rows {
            table
                .rows
                .push(indices.iter().map(|i| i.and_then(|i| row[i].clone())).collect());
        }
        table
    }

    /// Keep rows for which the predicate holds
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&[String], &Row) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|row| f(columns, row));
    }

    /// Drop rows missing a value in any of the named columns
    pub fn drop_missing(&mut self, names: &[&str]) -> Result<usize, TableError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;
        let before = self.rows.len();
        self.rows.retain(|row| {
            indices
                .iter()
                .all(|&i| row[i].as_deref().is_some_and(|v| !v.trim().is_empty()))
        });
        Ok(before - self.rows.len())
    }

    /// Remove rows identical to an earlier row
    pub fn drop_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
    }

    /// Stable sort by the named columns; numbers compare numerically, missing values last
    pub fn sort_by_columns(&mut self, names: &[&str]) -> Result<(), TableError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;
        self.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| compare_cells(a[i].as_deref(), b[i].as_deref()))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }

    /// Split comma separated cells of `column` into one row each
    ///
    /// Spaces are removed before splitting. `flag_column` is set to `True` on
    /// every row produced from a multi-valued cell and `False` otherwise.
    pub fn explode(&mut self, column: &str, flag_column: &str) -> Result<(), TableError> {
        let idx = self.require_column(column)?;
        let flag = self.ensure_column(flag_column);

        let mut exploded = Vec::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            let parts: Vec<String> = row[idx]
                .as_deref()
                .map(|cell| {
                    cell.replace(' ', "")
                        .split(',')
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let duplicated = parts.len() > 1;
            if parts.is_empty() {
                let mut row = row;
                row[idx] = None;
                row[flag] = Some(bool_cell(false));
                exploded.push(row);
                continue;
            }

            for part in parts {
                let mut copy = row.clone();
                copy[idx] = Some(part);
                copy[flag] = Some(bool_cell(duplicated));
                exploded.push(copy);
            }
        }

        self.rows = exploded;
        Ok(())
    }

    /// Stack tables, taking the union of their columns in first-seen order
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut result = Table::new(columns);
        for mut table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|c| result.column_index(c))
                .collect();
            for row in table.rows.drain(..) {
                let mut cells: Row = vec![None; result.columns.len()];
                for (value, &target) in row.into_iter().zip(&mapping) {
                    cells[target] = value;
                }
                result.rows.push(cells);
            }
        }
        result
    }
}

/// Boolean cell text, as written by the summary tables
pub fn bool_cell(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

/// Order two cells: numbers by value, then text, then `None`
pub fn compare_cells(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (numeric_cell(a), numeric_cell(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        },
    }
}

fn numeric_cell(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
