use std::path::Path;
use tracing::{debug, info, warn};

use super::sheet::{SheetError, SheetReader};
use crate::table::Table;

pub const CARBON_PREFIX: &str = "DIC: ";
pub const CRUISE_ID_COLUMN: &str = "CRUISE_ID";

/// Carbon system columns kept for the summary, in workbook naming
pub const CARBON_COLUMNS: [&str; 9] = [
    "CAST_NO",
    "NISKIN_NO",
    "DIC_UMOL_KG",
    "DIC_FLAG_W",
    "TA_UMOL_KG",
    "TA_FLAG_W",
    "PH_TOT_MEA",
    "TMP_PH_DEG_C",
    "PH_FLAG_W",
];

/// Read the first sheet of a carbon workbook
///
/// Published workbooks carry a title row above the column names; the header
/// is taken from the first row when it already names `CRUISE_ID`, otherwise
/// from the second.
pub fn load_carbon_sheet(path: &Path) -> Result<Table, SheetError> {
    let reader = SheetReader::new(path);
    let table = reader.read_first_sheet(0)?;
    if table.has_column(CRUISE_ID_COLUMN) {
        return Ok(table);
    }
    debug!("No {} in first row, using second row as header", CRUISE_ID_COLUMN);
    reader.read_first_sheet(1)
}

/// Rows of one cruise leg, projected onto `CARBON_COLUMNS` and prefixed `DIC: `
pub fn prepare_carbon(sheet: &Table, cruise_id: Option<&str>) -> Table {
    let mut rows = sheet.clone();
    match (cruise_id, rows.column_index(CRUISE_ID_COLUMN)) {
        (Some(cruise_id), Some(idx)) => {
            rows.retain(|_, row| row[idx].as_deref().map(str::trim) == Some(cruise_id));
        }
        (Some(_), None) => warn!("Carbon sheet has no {} column, keeping all rows", CRUISE_ID_COLUMN),
        (None, _) => warn!("No cruise id known, keeping all carbon rows"),
    }

    let mut table = rows.select(&CARBON_COLUMNS);
    table.prefix_columns(CARBON_PREFIX);
    info!("Selected {} carbon samples", table.len());
    table
}

pub fn load_carbon(path: &Path, cruise_id: Option<&str>) -> Result<Table, SheetError> {
    let sheet = load_carbon_sheet(path)?;
    Ok(prepare_carbon(&sheet, cruise_id))
}

/// Rewrite a leg cruise id like `AR18-A` to `<prefix>A`
///
/// Ids without a trailing `-<letter>` leg marker are returned unchanged.
///
/// # Examples
///
/// ```
/// use cruise_bottle_summary::importers::carbon::normalize_leg_cruise_id;
///
/// assert_eq!(normalize_leg_cruise_id("AR18-B", "AR-18"), "AR-18B");
/// assert_eq!(normalize_leg_cruise_id("AR-18", "AR-18"), "AR-18");
/// ```
pub fn normalize_leg_cruise_id(raw: &str, prefix: &str) -> String {
    let raw = raw.trim();
    match raw.rsplit_once('-') {
        Some((_, leg)) if leg.len() == 1 && leg.chars().all(|c| c.is_ascii_alphabetic()) => {
            format!("{prefix}{}", leg.to_ascii_uppercase())
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn sheet() -> Table {
        let mut t = Table::with_columns(&["CRUISE_ID", "CAST_NO", "NISKIN_NO", "DIC_UMOL_KG", "SAMPLE_ID"]);
        t.push_row(vec![cell("AR-18A"), cell("3"), cell("1"), cell("2051.3"), cell("D1")]);
        t.push_row(vec![cell("AR-18B"), cell("1"), cell("2"), cell("2049.0"), cell("D2")]);
        t
    }

    #[test]
    fn test_prepare_carbon_filters_cruise() {
        let table = prepare_carbon(&sheet(), Some("AR-18A"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns().len(), CARBON_COLUMNS.len());
        assert_eq!(table.get(0, "DIC: DIC_UMOL_KG"), Some("2051.3"));
        assert_eq!(table.get(0, "DIC: PH_FLAG_W"), None);
    }

    #[test]
    fn test_prepare_carbon_without_cruise_id() {
        let table = prepare_carbon(&sheet(), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_normalize_leg_cruise_id() {
        assert_eq!(normalize_leg_cruise_id("AR18-A", "AR-18"), "AR-18A");
        assert_eq!(normalize_leg_cruise_id("ar18-c ", "AR-18"), "AR-18C");
        assert_eq!(normalize_leg_cruise_id("AR-18", "AR-18"), "AR-18");
        assert_eq!(normalize_leg_cruise_id("AR18-AB", "AR-18"), "AR18-AB");
    }
}
