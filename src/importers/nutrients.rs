use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

use super::sheet::{SheetError, SheetReader};
use crate::table::Table;

pub const NUTRIENTS_SHEET: &str = "Summary";
pub const NUTRIENTS_PREFIX: &str = "Nuts: ";
pub const SAMPLE_ID_COLUMN: &str = "Nuts: Sample ID";

/// Concentration columns, as named after header cleanup
pub const NUTRIENT_COLUMNS: [&str; 6] = [
    "Nuts: Nitrate",
    "Nuts: Phosphate",
    "Nuts: Silicate",
    "Nuts: Nitrate+Nitrite",
    "Nuts: Ammonium",
    "Nuts: Nitrite",
];

static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]\s*$").expect("valid unit regex"));

/// `Avg: Nitrate [µmol/L]` → `Nitrate`
pub fn clean_nutrient_header(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("Avg: ").unwrap_or(name);
    UNIT_SUFFIX.replace(name, "").into_owned()
}

pub fn load_nutrients(path: &Path) -> Result<Table, SheetError> {
    let mut table = SheetReader::new(path).read_sheet(NUTRIENTS_SHEET, 0)?;
    table.rename_columns(|c| format!("{NUTRIENTS_PREFIX}{}", clean_nutrient_header(c)));
    info!("Loaded {} nutrient samples", table.len());
    Ok(table)
}
