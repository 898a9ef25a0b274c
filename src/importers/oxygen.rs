use std::path::Path;
use tracing::{debug, info, warn};

use super::discrete::keyed_samples;
use super::sheet::{matching_files, SheetError, SheetReader};
use crate::table::Table;

pub const OXYGEN_PREFIX: &str = "Oxy: ";
pub const OXYGEN_KEY: &str = "Oxygen Bottle #";
pub const OXYGEN_COLUMN: &str = "Oxygen [mL/L]";

const REQUIRED: [&str; 4] = ["Station", "Case", "Sample ID", OXYGEN_COLUMN];

/// Whether a file name looks like a Winkler oxygen workbook (`*oxy*.xlsx`)
pub fn is_oxygen_workbook(file_name: &str) -> bool {
    file_name.to_lowercase().contains("oxy") && file_name.ends_with(".xlsx")
}

/// Normalize the cleaned oxygen workbook columns and key the samples
pub fn prepare_oxygen(mut table: Table) -> Result<Table, SheetError> {
    table.rename("Niskin #", "Niskin");
    table.rename("Sample#", "Sample ID");
    table.rename("Oxy", OXYGEN_COLUMN);
    table.rename("Unit", "Units");

    let dropped = table.drop_missing(&REQUIRED)?;
    if dropped > 0 {
        debug!("Dropped {} incomplete oxygen rows", dropped);
    }

    // Cruise ids are typed with a letter O in place of zero in these workbooks
    if table.has_column("Cruise") {
        table.map_column("Cruise", |v| Some(v.replace('O', "0")))?;
    }

    Ok(keyed_samples(table, OXYGEN_PREFIX, OXYGEN_KEY)?)
}

/// Load every oxygen workbook in `dir`; `None` when there are none
pub fn load_oxygen(dir: &Path) -> Result<Option<Table>, SheetError> {
    let workbooks = matching_files(dir, is_oxygen_workbook)?;
    if workbooks.is_empty() {
        warn!("No oxygen workbooks found in {}", dir.display());
        return Ok(None);
    }

    let mut tables = Vec::with_capacity(workbooks.len());
    for path in &workbooks {
        tables.push(SheetReader::new(path).read_first_sheet(0)?);
    }

    let table = prepare_oxygen(Table::concat(tables))?;
    info!(
        "Loaded {} oxygen samples from {} workbooks",
        table.len(),
        workbooks.len()
    );
    Ok(Some(table))
}
