// Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A two bottle file from cast 002 of cruise AR-08B
pub const BOTTLE_FILE: &str = "\
* Sea-Bird SBE 9 Data File:
* FileName = C:\\AR08B\\ar08b002.hex
* NMEA Latitude = 40 08.08 N
* NMEA Longitude = 070 46.59 W
* NMEA UTC (Time) = Sep 27 2016  18:04:23
** Cruise ID: AR-08B
# nquan = 4
    Bottle        Date      PrDM     T090C
  Position        Time
      1    Sep 27 2016  1102.535    4.2233 (avg)
               18:41:18     0.139    0.0001 (sdev)
      2    Sep 27 2016   500.100    6.1000 (avg)
               18:50:02     0.101    0.0002 (sdev)
";

/// Header timestamp that cannot be parsed
pub const BROKEN_BOTTLE_FILE: &str = "* NMEA UTC (Time) = 99 99 9999\nBottle  Date\n";

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

pub fn cell(value: &str) -> Option<String> {
    Some(value.to_string())
}
