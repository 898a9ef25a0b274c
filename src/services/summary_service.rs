use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::bottle_service::CTD_SUMMARY_FILE;
use super::summary_schema::{
    pad_flag_columns, BOTTLE_POSITION, CARBON_UPDATES, CRUISE, MISSING_VALUE, STATION,
    SUMMARY_COLUMNS,
};
use super::ServiceError;
use crate::config::{Config, ConfigError};
use crate::importers::carbon::{
    load_carbon, load_carbon_sheet, normalize_leg_cruise_id, CARBON_COLUMNS, CARBON_PREFIX,
    CRUISE_ID_COLUMN,
};
use crate::importers::chlorophyll::{load_chlorophyll, normalize_log_filter_id, FILTER_COLUMN};
use crate::importers::nutrients::{load_nutrients, NUTRIENT_COLUMNS, SAMPLE_ID_COLUMN};
use crate::importers::oxygen::{load_oxygen, OXYGEN_COLUMN, OXYGEN_KEY, OXYGEN_PREFIX};
use crate::importers::salinity::{load_salinity, SALINITY_COLUMN, SALINITY_KEY, SALINITY_PREFIX};
use crate::importers::sampling_log::{
    SamplingLog, DIC_BOTTLE_COLUMN, FILTER_SAMPLE_COLUMN, NISKIN_COLUMN, NITRATE_BOTTLE_COLUMN,
    OXYGEN_BOTTLE_COLUMN, PH_BOTTLE_COLUMN, SALTS_BOTTLE_COLUMN, START_DATE_COLUMN,
    STATION_CAST_COLUMN,
};
use crate::table::{JoinKeys, Table, TableError};

const CTD_PREFIX: &str = "CTD: ";
const CTD_CAST: &str = "CTD: Cast";
const CTD_BOTTLE_POSITION: &str = "CTD: Bottle Position";

/// Merged columns filled from another source when missing
const METADATA_FILLS: [(&str, &str); 5] = [
    (STATION_CAST_COLUMN, CTD_CAST),
    ("CTD: Start Latitude [degrees]", "Log: Start Latitude"),
    ("CTD: Start Longitude [degrees]", "Log: Start Longitude"),
    ("CTD: Start Time [UTC]", START_DATE_COLUMN),
    (CTD_BOTTLE_POSITION, NISKIN_COLUMN),
];

/// All inputs of one cruise summary; lab sources are `None` when not available yet
#[derive(Debug, Clone)]
pub struct SummarySources {
    pub log: SamplingLog,
    pub salinity: Option<Table>,
    pub oxygen: Option<Table>,
    pub chlorophyll: Option<Table>,
    pub nutrients: Option<Table>,
    pub carbon: Option<Table>,
    /// The cruise CTD table written by the bottle step
    pub ctd: Table,
    /// Cruise id for rows the sampling log leaves without one, and for the file name
    pub cruise_id: Option<String>,
}

impl SummarySources {
    /// Load every configured source
    ///
    /// The carbon workbook is filtered to the cruise id, so it is loaded after
    /// the log and CTD table have been read.
    pub fn load(config: &Config) -> Result<Self, ServiceError> {
        let ctd_path = config.ctd_dir()?.join(CTD_SUMMARY_FILE);
        info!("Loading CTD table from {}", ctd_path.display());
        let ctd = Table::read_csv(&ctd_path)?;

        let log = match &config.sampling_log {
            Some(path) => SamplingLog::load(path)?,
            None => {
                warn!("No sampling log configured, using CTD bottles only");
                SamplingLog::empty()
            }
        };

        let (salinity, oxygen) = match &config.salinity_oxygen_dir {
            Some(dir) => (load_salinity(dir)?, load_oxygen(dir)?),
            None => (None, None),
        };
        let chlorophyll = config
            .chlorophyll
            .as_deref()
            .map(load_chlorophyll)
            .transpose()?;
        let nutrients = config
            .nutrients
            .as_deref()
            .map(load_nutrients)
            .transpose()?;

        let mut sources = Self {
            log,
            salinity,
            oxygen,
            chlorophyll,
            nutrients,
            carbon: None,
            ctd,
            cruise_id: config.cruise_id.clone(),
        };

        if let Some(path) = &config.carbon {
            let cruise_id = sources.resolve_cruise_id();
            sources.carbon = Some(load_carbon(path, cruise_id.as_deref())?);
        }

        Ok(sources)
    }

    /// Configured cruise id, else the first in the sampling log, else the first CTD header cruise
    pub fn resolve_cruise_id(&self) -> Option<String> {
        self.cruise_id
            .clone()
            .or_else(|| self.log.cruise_id.clone())
            .or_else(|| {
                self.ctd
                    .column("Cruise")
                    .and_then(|cells| cells.into_iter().flatten().next().map(str::to_string))
            })
    }
}

/// Merge all sources into the published per-bottle summary table
pub fn assemble_summary(sources: SummarySources) -> Result<Table, ServiceError> {
    let cruise_id = sources.resolve_cruise_id();
    let SummarySources {
        mut log,
        salinity,
        oxygen,
        chlorophyll,
        nutrients,
        carbon,
        ctd,
        ..
    } = sources;

    log.explode_duplicates()?;
    let merged = merge_salinity(log.table, salinity)?;
    let merged = merge_oxygen(merged, oxygen)?;
    let merged = merge_chlorophyll(merged, chlorophyll)?;
    let merged = merge_nutrients(merged, nutrients)?;
    let merged = merge_carbon(merged, carbon)?;
    let merged = merge_ctd(merged, ctd)?;

    Ok(finalize_summary(merged, cruise_id.as_deref())?)
}

/// Copy sample ids into `target` as placeholders; an absent source leaves `target` empty
fn fill_with_sample_ids(table: &mut Table, target: &str, source: &str) -> Result<(), TableError> {
    if table.has_column(source) {
        table.copy_column(source, target)
    } else {
        table.ensure_column(target);
        Ok(())
    }
}

pub fn merge_salinity(mut log: Table, salinity: Option<Table>) -> Result<Table, TableError> {
    let Some(salinity) = salinity else {
        fill_with_sample_ids(&mut log, &format!("{SALINITY_PREFIX}{SALINITY_COLUMN}"), SALTS_BOTTLE_COLUMN)?;
        return Ok(log);
    };

    let station = format!("{SALINITY_PREFIX}Station");
    let key = format!("{SALINITY_PREFIX}{SALINITY_KEY}");
    let mut merged = log.left_join(
        &salinity,
        JoinKeys::new(&[STATION_CAST_COLUMN, SALTS_BOTTLE_COLUMN], &[station.as_str(), key.as_str()]),
    )?;
    merged.drop_columns(&["Sal: Cruise", "Sal: Station", "Sal: Cast", "Sal: Niskin", "Sal: Salts Bottle #"]);
    Ok(merged)
}

pub fn merge_oxygen(mut log: Table, oxygen: Option<Table>) -> Result<Table, TableError> {
    let Some(oxygen) = oxygen else {
        fill_with_sample_ids(&mut log, &format!("{OXYGEN_PREFIX}{OXYGEN_COLUMN}"), OXYGEN_BOTTLE_COLUMN)?;
        return Ok(log);
    };

    let station = format!("{OXYGEN_PREFIX}Station");
    let key = format!("{OXYGEN_PREFIX}{OXYGEN_KEY}");
    let mut merged = log.left_join(
        &oxygen,
        JoinKeys::new(&[STATION_CAST_COLUMN, OXYGEN_BOTTLE_COLUMN], &[station.as_str(), key.as_str()]),
    )?;
    merged.drop_columns(&["Oxy: Cruise", "Oxy: Station", "Oxy: Niskin", "Oxy: Oxygen Bottle #", "Oxy: Units"]);
    Ok(merged)
}

pub fn merge_chlorophyll(mut log: Table, chlorophyll: Option<Table>) -> Result<Table, TableError> {
    log.ensure_column(FILTER_SAMPLE_COLUMN);
    log.map_column(FILTER_SAMPLE_COLUMN, |v| Some(normalize_log_filter_id(v)))?;

    let Some(chlorophyll) = chlorophyll else {
        fill_with_sample_ids(&mut log, "Chl: Chl (ug/l)", FILTER_SAMPLE_COLUMN)?;
        fill_with_sample_ids(&mut log, "Chl: Phaeo (ug/l)", FILTER_SAMPLE_COLUMN)?;
        log.ensure_column("Chl: Comments");
        return Ok(log);
    };

    let mut merged = log.left_join(
        &chlorophyll,
        JoinKeys::new(&[FILTER_SAMPLE_COLUMN], &[FILTER_COLUMN]),
    )?;
    merged.drop_columns(&["Chl: Station-Cast #", "Chl: Niskin #", FILTER_COLUMN]);
    Ok(merged)
}

pub fn merge_nutrients(mut log: Table, nutrients: Option<Table>) -> Result<Table, TableError> {
    let Some(nutrients) = nutrients else {
        for column in NUTRIENT_COLUMNS {
            fill_with_sample_ids(&mut log, column, NITRATE_BOTTLE_COLUMN)?;
        }
        return Ok(log);
    };

    let mut merged = log.left_join(
        &nutrients,
        JoinKeys::new(&[NITRATE_BOTTLE_COLUMN], &[SAMPLE_ID_COLUMN]),
    )?;
    merged.drop_columns(&[SAMPLE_ID_COLUMN]);
    Ok(merged)
}

pub fn merge_carbon(mut log: Table, carbon: Option<Table>) -> Result<Table, TableError> {
    let Some(carbon) = carbon else {
        // pH bottles are drawn separately from the DIC/TA bottles
        for column in CARBON_COLUMNS.iter().skip(2) {
            let target = format!("{CARBON_PREFIX}{column}");
            let source = if column.to_lowercase().contains("ph") {
                PH_BOTTLE_COLUMN
            } else {
                DIC_BOTTLE_COLUMN
            };
            fill_with_sample_ids(&mut log, &target, source)?;
        }
        return Ok(log);
    };

    let mut merged = log.left_join(
        &carbon,
        JoinKeys::new(
            &[STATION_CAST_COLUMN, NISKIN_COLUMN],
            &["DIC: CAST_NO", "DIC: NISKIN_NO"],
        ),
    )?;
    merged.drop_columns(&["DIC: CAST_NO", "DIC: NISKIN_NO"]);
    Ok(merged)
}

/// Prefix the CTD table and outer-join it with the log on cast and bottle position
///
/// Every logged bottle and every fired CTD bottle appears in the result.
pub fn merge_ctd(log: Table, mut ctd: Table) -> Result<Table, TableError> {
    ctd.rename_columns(|c| format!("{CTD_PREFIX}{}", c.replace("CTD ", "")));
    ctd.map_column(CTD_CAST, |v| {
        let cast = v.trim_start_matches('0');
        (!cast.is_empty()).then(|| cast.to_string())
    })?;

    let mut merged = log.outer_join(
        &ctd,
        JoinKeys::new(
            &[STATION_CAST_COLUMN, NISKIN_COLUMN],
            &[CTD_CAST, CTD_BOTTLE_POSITION],
        ),
    )?;
    merged.drop_duplicates();
    debug!("Merged log and CTD: {} rows", merged.len());
    Ok(merged)
}

/// Project the merged table onto the published columns
///
/// Fills metadata from the other source, sorts by cruise, station and bottle
/// position, and removes duplicate rows. Rows without a cruise get
/// `cruise_id`; cruise ids from the log are kept. Remaining gaps get the
/// missing value marker, and flags are padded.
pub fn finalize_summary(mut merged: Table, cruise_id: Option<&str>) -> Result<Table, TableError> {
    if merged.has_column("Log: Bottom Depth [m]") {
        merged.map_column("Log: Bottom Depth [m]", |v| Some(v.replace('m', "").trim().to_string()))?;
    }

    for (target, source) in METADATA_FILLS {
        merged.ensure_column(target);
        merged.ensure_column(source);
        merged.fill_from(target, source)?;
    }

    let indices: Vec<Option<usize>> = SUMMARY_COLUMNS
        .iter()
        .map(|(name, source)| {
            source.and_then(|source| {
                let idx = merged.column_index(source);
                if idx.is_none() {
                    warn!("No '{}' column for '{}', leaving it missing", source, name);
                }
                idx
            })
        })
        .collect();

    let names: Vec<String> = SUMMARY_COLUMNS.iter().map(|(name, _)| name.to_string()).collect();
    let mut summary = Table::new(names);
    for row in merged.rows() {
        summary.push_row(indices.iter().map(|i| i.and_then(|i| row[i].clone())).collect());
    }

    summary.sort_by_columns(&[CRUISE, STATION, BOTTLE_POSITION])?;
    summary.drop_duplicates();

    match cruise_id {
        Some(cruise_id) => summary.fill_column(CRUISE, cruise_id)?,
        None => warn!("No cruise id known, rows without one keep the missing marker"),
    }
    summary.fill_missing(MISSING_VALUE);
    pad_flag_columns(&mut summary)?;

    info!("Summary has {} bottles", summary.len());
    Ok(summary)
}

/// Refresh the carbon columns of a published summary from a new carbon workbook
///
/// Rows are matched on cruise, station and bottle position. With a
/// `cruise_prefix`, leg ids in the workbook such as `AR18-A` become
/// `<prefix>A` before matching. Unmatched rows get the missing marker.
pub fn update_carbon(
    summary: &Table,
    carbon_sheet: &Table,
    cruise_prefix: Option<&str>,
) -> Result<Table, TableError> {
    let mut carbon = carbon_sheet.clone();
    if let Some(prefix) = cruise_prefix {
        carbon.map_column(CRUISE_ID_COLUMN, |v| Some(normalize_leg_cruise_id(v, prefix)))?;
    }

    let mut joined = summary.left_join(
        &carbon,
        JoinKeys::new(
            &[CRUISE, STATION, BOTTLE_POSITION],
            &[CRUISE_ID_COLUMN, "CAST_NO", "NISKIN_NO"],
        ),
    )?;
    for (target, source) in CARBON_UPDATES {
        joined.copy_column(source, target)?;
    }

    let keep: Vec<&str> = summary.columns().iter().map(String::as_str).collect();
    let mut updated = joined.select(&keep);
    updated.fill_missing(MISSING_VALUE);
    pad_flag_columns(&mut updated)?;
    Ok(updated)
}

/// Runs the summary and carbon update steps against the configured paths
pub struct SummaryService {
    config: Config,
}

impl SummaryService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the cruise summary and write it to the output directory
    #[instrument(skip(self))]
    pub fn run(&self, date: NaiveDate) -> Result<PathBuf, ServiceError> {
        let start_time = Instant::now();
        let sources = SummarySources::load(&self.config)?;
        let cruise_id = sources
            .resolve_cruise_id()
            .ok_or(ServiceError::MissingCruiseId)?;
        info!("Building discrete summary for cruise {}", cruise_id);

        let summary = assemble_summary(sources)?;

        let output_dir = self.config.output_dir()?;
        std::fs::create_dir_all(&output_dir)?;
        let path = output_dir.join(self.config.summary_file_name(&cruise_id, date)?);
        summary.write_csv(&path)?;

        info!(
            "Wrote {} rows to {} in {:.2}s",
            summary.len(),
            path.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(path)
    }

    /// Rewrite `summary_path` with refreshed carbon data into `output_path`
    #[instrument(skip(self))]
    pub fn update_carbon_file(
        &self,
        summary_path: &Path,
        output_path: &Path,
        cruise_prefix: Option<&str>,
    ) -> Result<usize, ServiceError> {
        let carbon_path = self
            .config
            .carbon
            .as_deref()
            .ok_or(ConfigError::Missing("CARBON_PATH"))?;

        let summary = Table::read_csv(summary_path)?;
        let carbon_sheet = load_carbon_sheet(carbon_path)?;
        let updated = update_carbon(&summary, &carbon_sheet, cruise_prefix)?;
        updated.write_csv(output_path)?;

        info!(
            "Updated carbon data for {} rows, wrote {}",
            updated.len(),
            output_path.display()
        );
        Ok(updated.len())
    }
}
