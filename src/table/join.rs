use std::collections::HashMap;
use tracing::debug;

use super::{Row, Table, TableError};
use crate::utils::normalize_key;

/// Column pairs to match rows on
#[derive(Debug, Clone, Copy)]
pub struct JoinKeys<'a> {
    pub left: &'a [&'a str],
    pub right: &'a [&'a str],
}

impl<'a> JoinKeys<'a> {
    pub fn new(left: &'a [&'a str], right: &'a [&'a str]) -> Self {
        Self { left, right }
    }
}

impl Table {
    /// Keep every row of `self`, adding the columns of each matching `right` row
    ///
    /// Keys are compared after `normalize_key`. A row with any missing key
    /// never matches. Several matches produce several rows.
    pub fn left_join(&self, right: &Table, keys: JoinKeys<'_>) -> Result<Table, TableError> {
        self.join(right, keys, false)
    }

    /// Like `left_join`, plus the `right` rows that matched nothing
    pub fn outer_join(&self, right: &Table, keys: JoinKeys<'_>) -> Result<Table, TableError> {
        self.join(right, keys, true)
    }

    fn join(&self, right: &Table, keys: JoinKeys<'_>, outer: bool) -> Result<Table, TableError> {
        let left_idx = key_indices(self, keys.left)?;
        let right_idx = key_indices(right, keys.right)?;

        let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(key) = row_key(row, &right_idx) {
                index.entry(key).or_default().push(i);
            }
        }

        let mut columns = self.columns.clone();
        for column in &right.columns {
            if columns.contains(column) {
                columns.push(format!("{column}_y"));
            } else {
                columns.push(column.clone());
            }
        }

        let mut result = Table::new(columns);
        let mut matched = vec![false; right.rows.len()];
        let empty_right: Row = vec![None; right.columns.len()];

        for row in &self.rows {
            let matches = row_key(row, &left_idx)
                .and_then(|key| index.get(&key))
                .filter(|m| !m.is_empty());

            match matches {
                Some(matches) => {
                    for &m in matches {
                        matched[m] = true;
                        let mut cells = row.clone();
                        cells.extend(right.rows[m].iter().cloned());
                        result.rows.push(cells);
                    }
                }
                None => {
                    let mut cells = row.clone();
                    cells.extend(empty_right.iter().cloned());
                    result.rows.push(cells);
                }
            }
        }

        if outer {
            for (i, row) in right.rows.iter().enumerate() {
                if !matched[i] {
                    let mut cells: Row = vec![None; self.columns.len()];
                    cells.extend(row.iter().cloned());
                    result.rows.push(cells);
                }
            }
        }

        debug!(
            "Joined {} x {} rows on {:?} = {:?} -> {} rows",
            self.len(),
            right.len(),
            keys.left,
            keys.right,
            result.len()
        );
        Ok(result)
    }
}

fn key_indices(table: &Table, names: &[&str]) -> Result<Vec<usize>, TableError> {
    names.iter().map(|n| table.require_column(n)).collect()
}

fn row_key(row: &Row, indices: &[usize]) -> Option<Vec<String>> {
    indices
        .iter()
        .map(|&i| {
            row[i]
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(normalize_key)
        })
        .collect()
}
