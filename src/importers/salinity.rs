use std::path::Path;
use tracing::{debug, info, warn};

use super::discrete::{integer_text, keyed_samples};
use super::sheet::{matching_files, SheetError, SheetReader};
use crate::table::Table;

pub const SALINITY_PREFIX: &str = "Sal: ";
pub const SALINITY_KEY: &str = "Salts Bottle #";
pub const SALINITY_COLUMN: &str = "Salinity [psu]";

const SAL_COLUMNS: [&str; 6] = ["Cruise", "Station", "Cast", "Case", "Sample ID", SALINITY_COLUMN];
const REQUIRED: [&str; 4] = ["Station", "Case", "Sample ID", SALINITY_COLUMN];

/// Parse one salinometer `.SAL` run file
///
/// The first line is a quoted comma separated run header (cruise, station,
/// cast, ..., case in field 8). Each following line holds whitespace
/// separated readings with the sample number first and the salinity third.
/// Sample `0` is the standard seawater reading and is skipped.
pub fn parse_sal_file(file_name: &str, content: &str) -> Result<Table, SheetError> {
    let mut lines = content.lines();
    let header = lines.next().ok_or_else(|| SheetError::InvalidData {
        file: file_name.to_string(),
        msg: "empty salinity file".to_string(),
    })?;

    let fields: Vec<String> = header
        .replace('"', "")
        .split(',')
        .map(|f| f.trim().to_string())
        .collect();
    if fields.len() < 9 {
        return Err(SheetError::InvalidData {
            file: file_name.to_string(),
            msg: format!("run header has {} fields, expected at least 9", fields.len()),
        });
    }

    let mut table = Table::with_columns(&SAL_COLUMNS);
    for (idx, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(sample) = tokens.first() else {
            continue;
        };
        match sample.parse::<i64>() {
            Ok(0) => continue,
            Ok(_) => {}
            Err(_) => {
                debug!("{}: skipping line {}: {}", file_name, idx + 2, line);
                continue;
            }
        }
        if tokens.len() < 3 {
            warn!("{}: line {} has no salinity value", file_name, idx + 2);
            continue;
        }

        table.push_row(vec![
            Some(fields[0].clone()),
            Some(fields[1].clone()),
            Some(fields[2].clone()),
            Some(fields[8].clone()),
            Some(tokens[0].to_string()),
            Some(tokens[2].to_string()),
        ]);
    }

    debug!("{}: {} salinity samples", file_name, table.len());
    Ok(table)
}

/// Load every salinity file in `dir` as a table keyed by `Sal: Salts Bottle #`
///
/// Salinometer `.SAL` files take precedence over `*SAL.xlsx` workbooks, which
/// take precedence over previously exported `*SAL.csv` files. Returns
/// `None` when the directory holds none of them.
pub fn load_salinity(dir: &Path) -> Result<Option<Table>, SheetError> {
    let sal_files = matching_files(dir, |n| n.ends_with(".SAL"))?;
    let mut table = if !sal_files.is_empty() {
        let mut tables = Vec::with_capacity(sal_files.len());
        for path in &sal_files {
            let content = std::fs::read_to_string(path)?;
            let name = path.display().to_string();
            tables.push(parse_sal_file(&name, &content)?);
        }
        Table::concat(tables)
    } else {
        let workbooks = matching_files(dir, |n| n.ends_with("SAL.xlsx"))?;
        if !workbooks.is_empty() {
            let mut tables = Vec::with_capacity(workbooks.len());
            for path in &workbooks {
                tables.push(SheetReader::new(path).read_first_sheet(0)?);
            }
            let mut table = Table::concat(tables);
            table.rename("Sample", "Sample ID");
            table.rename("Salinity", SALINITY_COLUMN);
            table.rename("Niskin #", "Niskin");
            table.rename("Case ID", "Case");
            table
        } else {
            let exports = matching_files(dir, |n| n.ends_with("SAL.csv"))?;
            if exports.is_empty() {
                warn!("No salinity files found in {}", dir.display());
                return Ok(None);
            }
            let mut tables = Vec::with_capacity(exports.len());
            for path in &exports {
                tables.push(Table::read_csv(path)?);
            }
            Table::concat(tables)
        }
    };

    let unnamed: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.to_lowercase().starts_with("unnamed"))
        .cloned()
        .collect();
    let unnamed: Vec<&str> = unnamed.iter().map(String::as_str).collect();
    table.drop_columns(&unnamed);

    let dropped = table.drop_missing(&REQUIRED)?;
    if dropped > 0 {
        debug!("Dropped {} incomplete salinity rows", dropped);
    }
    if table.has_column("Niskin") {
        table.map_column("Niskin", |v| Some(integer_text(v)))?;
    }

    info!("Loaded {} salinity samples from {}", table.len(), dir.display());
    Ok(Some(keyed_samples(table, SALINITY_PREFIX, SALINITY_KEY)?))
}
