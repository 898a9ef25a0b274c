use std::path::Path;
use tracing::info;

use super::sheet::{SheetError, SheetReader};
use crate::table::Table;

pub const CHLOROPHYLL_SHEET: &str = "Chl";
pub const CHLOROPHYLL_PREFIX: &str = "Chl: ";
pub const FILTER_COLUMN: &str = "Chl: Filter Sample #";

const CHLOROPHYLL_COLUMNS: [&str; 6] = [
    "Station-Cast #",
    "Niskin #",
    "Filter Sample #",
    "Chl (ug/l)",
    "Phaeo (ug/l)",
    "Comments",
];

/// Load the `Chl` sheet, keyed by the filter sample id with spaces removed
pub fn load_chlorophyll(path: &Path) -> Result<Table, SheetError> {
    let sheet = SheetReader::new(path).read_sheet(CHLOROPHYLL_SHEET, 0)?;
    let table = prepare_chlorophyll(&sheet)?;
    info!("Loaded {} chlorophyll samples", table.len());
    Ok(table)
}

pub fn prepare_chlorophyll(sheet: &Table) -> Result<Table, SheetError> {
    let mut table = sheet.select(&CHLOROPHYLL_COLUMNS);
    table.prefix_columns(CHLOROPHYLL_PREFIX);
    table.map_column(FILTER_COLUMN, |v| Some(v.replace(' ', "")))?;
    Ok(table)
}

/// Sampling log filter ids use `-` where the lab sheet uses `/`
pub fn normalize_log_filter_id(value: &str) -> String {
    value.replace('-', "/")
}
