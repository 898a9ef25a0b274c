use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::Path;
use tracing::{debug, info, warn};

use super::discrete::integer_text;
use super::sheet::{SheetError, SheetReader};
use crate::table::{Table, TableError};
use crate::utils::zfill;

pub const LOG_SHEET: &str = "Summary";
pub const LOG_PREFIX: &str = "Log: ";

pub const CRUISE_ID_COLUMN: &str = "Log: Cruise ID";
pub const STATION_CAST_COLUMN: &str = "Log: Station-Cast #";
pub const NISKIN_COLUMN: &str = "Log: Niskin #";
pub const START_DATE_COLUMN: &str = "Log: Start Date";
pub const START_TIME_COLUMN: &str = "Log: Start Time";
pub const SALTS_BOTTLE_COLUMN: &str = "Log: Salts Bottle #";
pub const OXYGEN_BOTTLE_COLUMN: &str = "Log: Oxygen Bottle #";
pub const NITRATE_BOTTLE_COLUMN: &str = "Log: Nitrate Bottle 1";
pub const FILTER_SAMPLE_COLUMN: &str = "Log: Chlorophyll Filter Sample #";
pub const PH_BOTTLE_COLUMN: &str = "Log: Ph Bottle #";
pub const DIC_BOTTLE_COLUMN: &str = "Log: DIC/TA Bottle #";

/// Columns of the log used when no sampling log is available
pub const LOG_COLUMNS: [&str; 21] = [
    CRUISE_ID_COLUMN,
    STATION_CAST_COLUMN,
    "Log: Target Station",
    "Log: Start Latitude",
    "Log: Start Longitude",
    START_DATE_COLUMN,
    "Log: Bottom Depth [m]",
    "Log: Date",
    NISKIN_COLUMN,
    "Log: Time",
    "Log: Trip Depth",
    OXYGEN_BOTTLE_COLUMN,
    PH_BOTTLE_COLUMN,
    DIC_BOTTLE_COLUMN,
    SALTS_BOTTLE_COLUMN,
    NITRATE_BOTTLE_COLUMN,
    "Log: Chlorophyll Brown Bottle #",
    FILTER_SAMPLE_COLUMN,
    "Log: Chlorophyll Brown Bottle Volume",
    "Log: Chlorophyll LN Tube",
    "Log: Comments",
];

/// Sample id columns that may list several bottles, with their duplicate flag column
pub const DUPLICATE_COLUMNS: [(&str, &str); 5] = [
    (SALTS_BOTTLE_COLUMN, "Log: Salts Duplicate"),
    (OXYGEN_BOTTLE_COLUMN, "Log: Oxygen Duplicate"),
    (NITRATE_BOTTLE_COLUMN, "Log: Nitrate Duplicate"),
    ("Log: Chlorophyll Brown Bottle #", "Log: Chlorophyll Duplicate"),
    (FILTER_SAMPLE_COLUMN, "Log: Chlorophyll Filter Duplicate"),
];

const LOG_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d", "%d-%b-%Y"];

/// The shipboard CTD sampling log
#[derive(Debug, Clone)]
pub struct SamplingLog {
    pub table: Table,
    /// First cruise id recorded in the log
    pub cruise_id: Option<String>,
}

impl SamplingLog {
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let sheet = SheetReader::new(path).read_sheet(LOG_SHEET, 0)?;
        let log = Self::from_sheet(sheet);
        info!(
            "Loaded sampling log with {} rows (cruise {:?})",
            log.table.len(),
            log.cruise_id
        );
        Ok(log)
    }

    /// Prefix the sheet columns and fold start date and time into one timestamp
    pub fn from_sheet(mut table: Table) -> Self {
        table.prefix_columns(LOG_PREFIX);

        if table.has_column(START_DATE_COLUMN) {
            let has_time = table.has_column(START_TIME_COLUMN);
            table.set_column_with(START_DATE_COLUMN, |t, i| {
                let time = if has_time { t.get(i, START_TIME_COLUMN) } else { None };
                combine_start(t.get(i, START_DATE_COLUMN), time)
            });
        }
        table.drop_columns(&[START_TIME_COLUMN]);

        let cruise_id = table
            .column(CRUISE_ID_COLUMN)
            .and_then(|cells| cells.into_iter().flatten().next().map(str::to_string));
        if cruise_id.is_none() {
            warn!("Sampling log has no cruise id");
        }

        Self { table, cruise_id }
    }

    /// Log with the standard columns and no rows
    pub fn empty() -> Self {
        Self {
            table: Table::with_columns(&LOG_COLUMNS),
            cruise_id: None,
        }
    }

    /// Give every bottle listed in a multi-valued sample cell its own row
    pub fn explode_duplicates(&mut self) -> Result<(), TableError> {
        for (column, flag) in DUPLICATE_COLUMNS {
            self.table.ensure_column(column);
            self.table.explode(column, flag)?;
            self.table.drop_duplicates();
            debug!("Exploded {}: {} rows", column, self.table.len());
        }
        Ok(())
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ` from a log date and an optional `HHMM` start time
///
/// A missing or unreadable time gives midnight; a missing or unreadable
/// date gives `None`.
pub fn combine_start(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = date?;
    let Some(date) = parse_log_date(date) else {
        warn!("Unreadable log start date: {}", date);
        return None;
    };
    let time = time.and_then(parse_log_time).unwrap_or(NaiveTime::MIN);
    Some(format!(
        "{}T{}Z",
        date.format("%Y-%m-%d"),
        time.format("%H:%M:%S")
    ))
}

pub fn parse_log_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    LOG_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Times are entered as `HHMM` numbers (`915` for 09:15) or read as `HH:MM:SS`
pub fn parse_log_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.contains(':') {
        return NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .ok();
    }
    let digits = zfill(&integer_text(value), 4);
    NaiveTime::parse_from_str(&digits, "%H%M").ok()
}
