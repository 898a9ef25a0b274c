// Helpers shared by the bottle-sample lab importers (salinity, oxygen)

use crate::table::{Table, TableError};
use crate::utils::{format_number, zfill};

/// Whole-number text for a numeric cell (`"12.0"` → `"12"`); other text is kept
pub fn integer_text(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => format_number(n.trunc()),
        _ => trimmed.to_string(),
    }
}

/// Station numbers as three-digit strings
pub fn pad_station(value: &str) -> String {
    zfill(&integer_text(value), 3)
}

/// Normalize station and sample ids, then prefix every column with `prefix`
/// and add `key_column` = case + sample id in place of the two source columns
pub fn keyed_samples(mut table: Table, prefix: &str, key_column: &str) -> Result<Table, TableError> {
    table.map_column("Station", |v| Some(pad_station(v)))?;
    table.map_column("Sample ID", |v| Some(integer_text(v)))?;

    table.prefix_columns(prefix);
    let case = format!("{prefix}Case");
    let sample = format!("{prefix}Sample ID");
    let key = format!("{prefix}{key_column}");

    table.set_column_with(&key, |t, i| {
        let case_id = t.get(i, &case)?;
        let sample_id = t.get(i, &sample)?;
        Some(format!("{case_id}{sample_id}"))
    });
    table.drop_columns(&[case.as_str(), sample.as_str()]);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_text() {
        assert_eq!(integer_text("12.0"), "12");
        assert_eq!(integer_text(" 7 "), "7");
        assert_eq!(integer_text("A3"), "A3");
    }

    #[test]
    fn test_pad_station() {
        assert_eq!(pad_station("3.0"), "003");
        assert_eq!(pad_station("12"), "012");
    }

    #[test]
    fn test_keyed_samples() {
        let mut table = Table::with_columns(&["Cruise", "Station", "Case", "Sample ID", "Salinity [psu]"]);
        table.push_row(vec![
            Some("AR18".to_string()),
            Some("4".to_string()),
            Some("B".to_string()),
            Some("15.0".to_string()),
            Some("33.512".to_string()),
        ]);

        let keyed = keyed_samples(table, "Sal: ", "Salts Bottle #").unwrap();
        assert_eq!(
            keyed.columns(),
            &["Sal: Cruise", "Sal: Station", "Sal: Salinity [psu]", "Sal: Salts Bottle #"]
        );
        assert_eq!(keyed.get(0, "Sal: Station"), Some("004"));
        assert_eq!(keyed.get(0, "Sal: Salts Bottle #"), Some("B15"));
    }
}
