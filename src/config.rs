use chrono::NaiveDate;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Settings for processing one cruise
///
/// Every optional source that is not set falls back to filling the summary
/// with the sample ids recorded in the sampling log.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the cast `.btl` files
    pub ctd_dir: Option<PathBuf>,
    pub sampling_log: Option<PathBuf>,
    /// Directory with `.SAL`/`SAL.xlsx` salinity and `*oxy*.xlsx` oxygen files
    pub salinity_oxygen_dir: Option<PathBuf>,
    pub chlorophyll: Option<PathBuf>,
    pub nutrients: Option<PathBuf>,
    pub carbon: Option<PathBuf>,
    /// Spreadsheet mapping instrument short channel names to full names
    pub name_map: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub cruise_name: Option<String>,
    pub cruise_id: Option<String>,
    pub version: String,
    pub skip_invalid_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ctd_dir: None,
            sampling_log: None,
            salinity_oxygen_dir: None,
            chlorophyll: None,
            nutrients: None,
            carbon: None,
            name_map: None,
            output_dir: None,
            cruise_name: None,
            cruise_id: None,
            version: "1-0".to_string(),
            skip_invalid_files: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = |var: &str| env::var(var).ok().filter(|v| !v.is_empty()).map(PathBuf::from);
        let text = |var: &str| env::var(var).ok().filter(|v| !v.is_empty());

        let skip_invalid_files = match text("SKIP_INVALID_FILES") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                var: "SKIP_INVALID_FILES",
                value,
            })?,
            None => false,
        };

        Ok(Config {
            ctd_dir: path("CTD_DIR"),
            sampling_log: path("SAMPLING_LOG"),
            salinity_oxygen_dir: path("SALINITY_OXYGEN_DIR"),
            chlorophyll: path("CHLOROPHYLL_PATH"),
            nutrients: path("NUTRIENTS_PATH"),
            carbon: path("CARBON_PATH"),
            name_map: path("NAME_MAP_PATH"),
            output_dir: path("OUTPUT_DIR"),
            cruise_name: text("CRUISE_NAME"),
            cruise_id: text("CRUISE_ID"),
            version: text("SUMMARY_VERSION").unwrap_or_else(|| "1-0".to_string()),
            skip_invalid_files,
        })
    }

    pub fn ctd_dir(&self) -> Result<&Path, ConfigError> {
        self.ctd_dir.as_deref().ok_or(ConfigError::Missing("CTD_DIR"))
    }

    /// Where cruise level outputs go: `OUTPUT_DIR`, else the parent of the CTD directory
    pub fn output_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        let ctd_dir = self.ctd_dir()?;
        Ok(ctd_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ctd_dir.to_path_buf()))
    }

    /// Cruise name for output files
    ///
    /// Falls back to the first `_` separated part of the output directory
    /// name, e.g. `Pioneer-07` for `Pioneer-07_AR-08_2016-09-27`.
    pub fn cruise_name(&self) -> Result<String, ConfigError> {
        if let Some(name) = &self.cruise_name {
            return Ok(name.clone());
        }
        self.output_dir()?
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('_').next())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::Missing("CRUISE_NAME"))
    }

    /// `<cruise name>_<cruise id>_Discrete_Summary_<date>_ver_<version>.csv`
    pub fn summary_file_name(
        &self,
        cruise_id: &str,
        date: NaiveDate,
    ) -> Result<String, ConfigError> {
        Ok(format!(
            "{}_{}_Discrete_Summary_{}_ver_{}.csv",
            self.cruise_name()?,
            cruise_id,
            date.format("%Y-%m-%d"),
            self.version
        ))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_ctd_parent() {
        let config = Config {
            ctd_dir: Some(PathBuf::from("/data/Pioneer-07_AR-08_2016-09-27/ctd")),
            ..Config::default()
        };
        assert_eq!(
            config.output_dir().unwrap(),
            PathBuf::from("/data/Pioneer-07_AR-08_2016-09-27")
        );
        assert_eq!(config.cruise_name().unwrap(), "Pioneer-07");
    }

    #[test]
    fn test_summary_file_name() {
        let config = Config {
            output_dir: Some(PathBuf::from("/data/Pioneer-08_AR-18_2017-05-30")),
            version: "1-2".to_string(),
            ..Config::default()
        };
        let date = NaiveDate::from_ymd_opt(2019, 11, 4).unwrap();
        assert_eq!(
            config.summary_file_name("AR-18", date).unwrap(),
            "Pioneer-08_AR-18_Discrete_Summary_2019-11-04_ver_1-2.csv"
        );
    }

    #[test]
    fn test_missing_ctd_dir() {
        let config = Config::default();
        assert!(matches!(config.ctd_dir(), Err(ConfigError::Missing("CTD_DIR"))));
        assert!(config.output_dir().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
