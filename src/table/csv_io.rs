use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use super::{Row, Table, TableError};

impl Table {
    /// Read a CSV file with a header row; empty cells become `None`
    pub fn read_csv(path: &Path) -> Result<Table, TableError> {
        debug!("Reading CSV table: {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::read_csv_from(file)
    }

    pub fn read_csv_from<R: Read>(reader: R) -> Result<Table, TableError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(columns);

        for record in rdr.records() {
            let record = record?;
            let row: Row = record
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }

    /// Write the table as CSV; missing cells are written empty
    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        debug!("Writing {} rows to {}", self.len(), path.display());
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
