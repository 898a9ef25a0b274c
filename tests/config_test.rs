// Configuration from environment variables

use cruise_bottle_summary::config::{Config, ConfigError};
use serial_test::serial;
use std::path::PathBuf;

const VARS: [&str; 13] = [
    "CTD_DIR",
    "SAMPLING_LOG",
    "SALINITY_OXYGEN_DIR",
    "CHLOROPHYLL_PATH",
    "NUTRIENTS_PATH",
    "CARBON_PATH",
    "NAME_MAP_PATH",
    "OUTPUT_DIR",
    "CRUISE_NAME",
    "CRUISE_ID",
    "SUMMARY_VERSION",
    "SKIP_INVALID_FILES",
    "RUST_LOG",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();

    assert!(config.ctd_dir.is_none());
    assert!(config.sampling_log.is_none());
    assert_eq!(config.version, "1-0");
    assert!(!config.skip_invalid_files);
    assert!(matches!(config.ctd_dir(), Err(ConfigError::Missing("CTD_DIR"))));
}

#[test]
#[serial]
fn test_from_env_reads_paths_and_names() {
    clear_env();
    std::env::set_var("CTD_DIR", "/cruises/Pioneer-07_AR-08/ctd");
    std::env::set_var("CARBON_PATH", "/cruises/carbon.xlsx");
    std::env::set_var("CRUISE_ID", "AR-08B");
    std::env::set_var("SUMMARY_VERSION", "2-1");
    std::env::set_var("SKIP_INVALID_FILES", "true");
    std::env::set_var("SAMPLING_LOG", "");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.ctd_dir, Some(PathBuf::from("/cruises/Pioneer-07_AR-08/ctd")));
    assert_eq!(config.carbon, Some(PathBuf::from("/cruises/carbon.xlsx")));
    assert!(config.sampling_log.is_none());
    assert_eq!(config.cruise_id.as_deref(), Some("AR-08B"));
    assert_eq!(config.version, "2-1");
    assert!(config.skip_invalid_files);
    assert_eq!(config.output_dir().unwrap(), PathBuf::from("/cruises/Pioneer-07_AR-08"));
    assert_eq!(config.cruise_name().unwrap(), "Pioneer-07");
}

#[test]
#[serial]
fn test_from_env_rejects_bad_flag() {
    clear_env();
    std::env::set_var("SKIP_INVALID_FILES", "sometimes");

    let result = Config::from_env();
    clear_env();

    match result {
        Err(ConfigError::InvalidValue { var, value }) => {
            assert_eq!(var, "SKIP_INVALID_FILES");
            assert_eq!(value, "sometimes");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}
