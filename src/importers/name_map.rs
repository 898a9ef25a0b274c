use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::sheet::{SheetError, SheetReader};
use crate::table::{Table, TableError};

pub const SHORT_NAME_COLUMN: &str = "Short Name";
pub const FULL_NAME_COLUMN: &str = "Full Name";

/// Instrument channel short names (`PrDM`, `T090C`, ...) to descriptive names
#[derive(Debug, Clone, Default)]
pub struct ChannelNameMap {
    names: HashMap<String, String>,
}

impl ChannelNameMap {
    /// Build from (short, full) pairs; the first pair for a short name wins
    pub fn from_pairs<I, S, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, F)>,
        S: AsRef<str>,
        F: Into<String>,
    {
        let mut names = HashMap::new();
        for (short, full) in pairs {
            names
                .entry(short.as_ref().trim().to_lowercase())
                .or_insert_with(|| full.into());
        }
        Self { names }
    }

    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        let shorts = table
            .column(SHORT_NAME_COLUMN)
            .ok_or_else(|| TableError::MissingColumn(SHORT_NAME_COLUMN.to_string()))?;
        let fulls = table
            .column(FULL_NAME_COLUMN)
            .ok_or_else(|| TableError::MissingColumn(FULL_NAME_COLUMN.to_string()))?;

        Ok(Self::from_pairs(
            shorts
                .into_iter()
                .zip(fulls)
                .filter_map(|(short, full)| Some((short?, full?.to_string()))),
        ))
    }

    /// Load the mapping from the first sheet of a workbook
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let table = SheetReader::new(path).read_first_sheet(0)?;
        let map = Self::from_table(&table)?;
        info!("Loaded {} channel names from {}", map.len(), path.display());
        Ok(map)
    }

    /// Case-insensitive lookup
    pub fn full_name(&self, short_name: &str) -> Option<&str> {
        self.names
            .get(&short_name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Rename every table column that has a full name; others keep their name
    pub fn apply(&self, table: &mut Table) {
        table.rename_columns(|column| match self.full_name(column) {
            Some(full) => full.to_string(),
            None => {
                debug!("No full name for channel '{}'", column);
                column.to_string()
            }
        });
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
