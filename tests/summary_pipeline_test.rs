// Integration tests for merging the sampling log, lab data and CTD bottles

mod common;

use chrono::NaiveDate;
use common::{cell, write_file, BOTTLE_FILE};
use cruise_bottle_summary::bottle::BottleFileParser;
use cruise_bottle_summary::config::Config;
use cruise_bottle_summary::importers::{ChannelNameMap, SamplingLog};
use cruise_bottle_summary::services::summary_schema::{MISSING_VALUE, SUMMARY_COLUMNS};
use cruise_bottle_summary::services::summary_service::assemble_summary;
use cruise_bottle_summary::services::{BottleService, SummarySources, SummaryService};
use cruise_bottle_summary::table::Table;

fn ctd_table() -> Table {
    let mut ctd = BottleFileParser::new()
        .parse_str("STA002_AR08B002.btl", BOTTLE_FILE)
        .unwrap()
        .to_table();
    ChannelNameMap::from_pairs([("PrDM", "Pressure, Digiquartz [db]")]).apply(&mut ctd);
    ctd
}

fn sampling_log() -> SamplingLog {
    let mut sheet = Table::with_columns(&[
        "Cruise ID",
        "Station-Cast #",
        "Niskin #",
        "Salts Bottle #",
        "Bottom Depth [m]",
        "Comments",
    ]);
    sheet.push_row(vec![
        cell("AR-08B"),
        cell("2"),
        cell("1"),
        cell("12"),
        cell("135 m"),
        cell("deep"),
    ]);
    SamplingLog::from_sheet(sheet)
}

fn salinity() -> Table {
    let mut sal = Table::with_columns(&[
        "Sal: Cruise",
        "Sal: Station",
        "Sal: Salts Bottle #",
        "Sal: Salinity [psu]",
    ]);
    sal.push_row(vec![cell("AR-08B"), cell("002"), cell("12"), cell("34.9871")]);
    sal
}

fn sources() -> SummarySources {
    SummarySources {
        log: sampling_log(),
        salinity: Some(salinity()),
        oxygen: None,
        chlorophyll: None,
        nutrients: None,
        carbon: None,
        ctd: ctd_table(),
        cruise_id: None,
    }
}

#[test]
fn test_assemble_summary_columns_and_rows() {
    let summary = assemble_summary(sources()).unwrap();

    assert_eq!(summary.columns().len(), 78);
    let expected: Vec<&str> = SUMMARY_COLUMNS.iter().map(|(name, _)| *name).collect();
    assert_eq!(summary.columns(), expected.as_slice());

    // Logged bottle 1 and the unlogged CTD bottle 2
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.get(0, "Niskin/Bottle Position"), Some("1"));
    assert_eq!(summary.get(1, "Niskin/Bottle Position"), Some("2"));
    assert_eq!(summary.get(1, "Station"), Some("2"));
}

#[test]
fn test_assemble_summary_values() {
    let summary = assemble_summary(sources()).unwrap();

    assert_eq!(summary.get(0, "Cruise"), Some("AR-08B"));
    assert_eq!(summary.get(1, "Cruise"), Some("AR-08B"));
    assert_eq!(summary.get(0, "Pressure [db]"), Some("1102.535"));
    assert_eq!(summary.get(1, "Pressure [db]"), Some("500.100"));
    assert_eq!(summary.get(0, "Start Time [UTC]"), Some("2016-09-27T18:04:23Z"));
    assert_eq!(summary.get(0, "Bottom Depth at Start Position [m]"), Some("135"));
    assert_eq!(summary.get(0, "Comments"), Some("deep"));

    assert_eq!(summary.get(0, "Discrete Salinity [psu]"), Some("34.9871"));
    assert_eq!(summary.get(1, "Discrete Salinity [psu]"), Some(MISSING_VALUE));
    assert_eq!(summary.get(0, "Discrete Salinity Duplicate Flag"), Some("False"));
}

#[test]
fn test_assemble_summary_fills_missing_values() {
    let summary = assemble_summary(sources()).unwrap();

    for row in summary.rows() {
        assert!(row.iter().all(|c| c.is_some()));
    }
    assert_eq!(summary.get(0, "Cast Flag"), Some(MISSING_VALUE));
    assert_eq!(summary.get(0, "Calculated Omega-A"), Some(MISSING_VALUE));
    assert_eq!(summary.get(0, "Discrete Oxygen [mL/L]"), Some(MISSING_VALUE));
}

#[test]
fn test_configured_cruise_id_fills_unlogged_rows() {
    let mut sources = sources();
    sources.cruise_id = Some("AR-08A".to_string());
    let summary = assemble_summary(sources).unwrap();

    // Bottle 1 is in the log with AR-08B, bottle 2 only fired on the CTD
    assert_eq!(
        summary.column("Cruise").unwrap(),
        vec![Some("AR-08B"), Some("AR-08A")]
    );
}

#[test]
fn test_service_run_writes_named_summary() {
    let cruise = tempfile::tempdir().unwrap();
    let ctd_dir = cruise.path().join("ctd");
    std::fs::create_dir(&ctd_dir).unwrap();
    write_file(&ctd_dir, "STA002_AR08B002.btl", BOTTLE_FILE);

    BottleService::new(None, false)
        .process_directory(&ctd_dir, |_, _| {})
        .unwrap();

    let output_dir = cruise.path().join("Pioneer-07_AR-08_2016-09-27");
    let config = Config {
        ctd_dir: Some(ctd_dir),
        output_dir: Some(output_dir.clone()),
        ..Config::default()
    };
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let path = SummaryService::new(config).run(date).unwrap();

    assert_eq!(
        path,
        output_dir.join("Pioneer-07_AR-08B_Discrete_Summary_2024-03-01_ver_1-0.csv")
    );
    let summary = Table::read_csv(&path).unwrap();
    assert_eq!(summary.columns().len(), 78);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.get(0, "Cruise"), Some("AR-08B"));
    assert_eq!(summary.get(1, "Discrete Salinity [psu]"), Some(MISSING_VALUE));
}

#[test]
fn test_update_carbon_file_requires_carbon_path() {
    let dir = tempfile::tempdir().unwrap();
    let summary = write_file(dir.path(), "summary.csv", "Cruise,Station\nAR-08B,2\n");

    let service = SummaryService::new(Config::default());
    let result = service.update_carbon_file(&summary, &dir.path().join("out.csv"), None);
    assert!(result.is_err());
    assert!(!dir.path().join("out.csv").exists());
}
