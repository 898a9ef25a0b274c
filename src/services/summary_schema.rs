// Column layout of the published discrete summary

use crate::table::{Table, TableError};
use crate::utils::zfill;

/// Written for every value that no source provided
pub const MISSING_VALUE: &str = "-9999999";

/// Width that quality flags are zero-padded to
pub const FLAG_WIDTH: usize = 16;

pub const CRUISE: &str = "Cruise";
pub const STATION: &str = "Station";
pub const BOTTLE_POSITION: &str = "Niskin/Bottle Position";

/// Output column, and the merged column it is copied from (`None`: always missing)
pub const SUMMARY_COLUMNS: [(&str, Option<&str>); 78] = [
    (CRUISE, Some("Log: Cruise ID")),
    (STATION, Some("Log: Station-Cast #")),
    ("Target Asset", Some("Log: Target Station")),
    ("Start Latitude [degrees]", Some("CTD: Start Latitude [degrees]")),
    ("Start Longitude [degrees]", Some("CTD: Start Longitude [degrees]")),
    ("Start Time [UTC]", Some("CTD: Start Time [UTC]")),
    ("Cast", Some("Log: Station-Cast #")),
    ("Cast Flag", None),
    ("Bottom Depth at Start Position [m]", Some("Log: Bottom Depth [m]")),
    ("File", Some("CTD: Filename")),
    ("File Flag", None),
    (BOTTLE_POSITION, Some("CTD: Bottle Position")),
    ("Niskin Flag", None),
    ("Bottle Closure Time [UTC]", Some("CTD: Date Time")),
    ("Pressure [db]", Some("CTD: Pressure, Digiquartz [db]")),
    ("Pressure Flag", None),
    ("Depth [m]", Some("CTD: Depth [salt water, m]")),
    ("Latitude [deg]", Some("CTD: Latitude [deg]")),
    ("Longitude [deg]", Some("CTD: Longitude [deg]")),
    ("Temperature 1 [deg C]", Some("CTD: Temperature [ITS-90, deg C]")),
    ("Temperature 1 Flag", None),
    ("Temperature 2 [deg C]", Some("CTD: Temperature, 2 [ITS-90, deg C]")),
    ("Temperature 2 Flag", None),
    ("Conductivity 1 [S/m]", Some("CTD: Conductivity [S/m]")),
    ("Conductivity 1 Flag", None),
    ("Conductivity 2 [S/m]", Some("CTD: Conductivity, 2 [S/m]")),
    ("Conductivity 2 Flag", None),
    ("Salinity 1, uncorrected [psu]", Some("CTD: Salinity, Practical [PSU]")),
    ("Salinity 2, uncorrected [psu]", Some("CTD: Salinity, Practical, 2 [PSU]")),
    ("Oxygen, uncorrected [mL/L]", Some("CTD: Oxygen, SBE 43 [ml/l]")),
    ("Oxygen Flag", None),
    ("Oxygen Saturation [mL/L]", Some("CTD: Oxygen Saturation, Garcia & Gordon [ml/l]")),
    ("Fluorescence [mg/m^3]", None),
    ("Fluorescence Flag", None),
    ("Beam Attenuation [1/m]", Some("CTD: Beam Attenuation, WET Labs C-Star [1/m]")),
    ("Beam Transmission [%]", Some("CTD: Beam Transmission, WET Labs C-Star [%]")),
    ("Transmissometer Flag", None),
    ("pH", None),
    ("pH Flag", None),
    ("Discrete Oxygen [mL/L]", Some("Oxy: Oxygen [mL/L]")),
    ("Discrete Oxygen Flag", None),
    ("Discrete Oxygen Duplicate Flag", Some("Log: Oxygen Duplicate")),
    ("Discrete Chlorophyll [ug/L]", Some("Chl: Chl (ug/l)")),
    ("Discrete Phaeopigment [ug/L]", Some("Chl: Phaeo (ug/l)")),
    ("Discrete Fo/Fa Ratio", None),
    ("Discrete Fluorescence Flag", None),
    ("Discrete Fluorescence Duplicate Flag", Some("Log: Chlorophyll Duplicate")),
    ("Discrete Phosphate [uM]", Some("Nuts: Phosphate")),
    ("Discrete Silicate [uM]", Some("Nuts: Silicate")),
    ("Discrete Nitrate [uM]", Some("Nuts: Nitrate")),
    ("Discrete Nitrite [uM]", Some("Nuts: Nitrite")),
    ("Discrete Ammonium [uM]", Some("Nuts: Ammonium")),
    ("Discrete Nutrients Flag", None),
    ("Discrete Nutrients Duplicate Flag", Some("Log: Nitrate Duplicate")),
    ("Discrete Salinity [psu]", Some("Sal: Salinity [psu]")),
    ("Discrete Salinity Flag", None),
    ("Discrete Salinity Duplicate Flag", Some("Log: Salts Duplicate")),
    ("Discrete Alkalinity [µmol/kg]", Some("DIC: TA_UMOL_KG")),
    ("Discrete Alkalinity Flag", Some("DIC: TA_FLAG_W")),
    ("Discrete DIC [µmol/kg]", Some("DIC: DIC_UMOL_KG")),
    ("Discrete DIC Flag", Some("DIC: DIC_FLAG_W")),
    ("Discrete pCO2 [µatm]", None),
    ("Discrete pCO2 Analysis Temp [C]", None),
    ("Discrete pCO2 Flag", None),
    ("Discrete pH [Total scale]", Some("DIC: PH_TOT_MEA")),
    ("Discrete pH Analysis Temp [C]", Some("DIC: TMP_PH_DEG_C")),
    ("Discrete pH Flag", Some("DIC: PH_FLAG_W")),
    ("Calculated Alkalinity [µmol/kg]", None),
    ("Calculated DIC [µmol/kg]", None),
    ("Calculated pCO2 [µatm]", None),
    ("Calculated pH", None),
    ("Calculated CO2aq [µmol/kg]", None),
    ("Calculated bicarb [µmol/kg]", None),
    ("Calculated CO3 [µmol/kg]", None),
    ("Calculated Omega-C", None),
    ("Calculated Omega-A", None),
    ("Comments", Some("Log: Comments")),
    ("Chl Comments", Some("Chl: Comments")),
];

/// Summary columns refreshed by a carbon update, with the carbon workbook column
pub const CARBON_UPDATES: [(&str, &str); 7] = [
    ("Discrete DIC [µmol/kg]", "DIC_UMOL_KG"),
    ("Discrete DIC Flag", "DIC_FLAG_W"),
    ("Discrete Alkalinity [µmol/kg]", "TA_UMOL_KG"),
    ("Discrete Alkalinity Flag", "TA_FLAG_W"),
    ("Discrete pH [Total scale]", "PH_TOT_MEA"),
    ("Discrete pH Analysis Temp [C]", "TMP_PH_DEG_C"),
    ("Discrete pH Flag", "PH_FLAG_W"),
];

pub fn is_flag_column(name: &str) -> bool {
    name.to_lowercase().contains("flag")
}

/// Zero-pad a flag to 16 characters unless it is the missing marker or a boolean
///
/// # Examples
///
/// ```
/// use cruise_bottle_summary::services::summary_schema::pad_flag;
///
/// assert_eq!(pad_flag("2"), "0000000000000002");
/// assert_eq!(pad_flag("-9999999"), "-9999999");
/// assert_eq!(pad_flag("True"), "True");
/// ```
pub fn pad_flag(value: &str) -> String {
    let lower = value.to_lowercase();
    if value == MISSING_VALUE || lower == "true" || lower == "false" {
        value.to_string()
    } else {
        zfill(value, FLAG_WIDTH)
    }
}

/// Apply `pad_flag` to every column whose name mentions a flag
pub fn pad_flag_columns(table: &mut Table) -> Result<(), TableError> {
    let flags: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| is_flag_column(c))
        .cloned()
        .collect();
    for column in flags {
        table.map_column(&column, |v| Some(pad_flag(v)))?;
    }
    Ok(())
}
