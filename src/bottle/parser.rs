/// Bottle (.btl) file parser
///
/// Turns one fixed-format bottle summary file into a `BottleFile`: header
/// metadata, the positional column layout, and one `SampleRow` per bottle
/// closure with the metadata and cast number broadcast onto every row.
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::bottle::column_layout::ColumnLayout;
use crate::bottle::error::BottleParseError;
use crate::bottle::header_parser::{parse_header, HeaderField, HeaderMetadata};
use crate::bottle::line_classifier::classify_lines;
use crate::bottle::row_builder::{build_rows, SampleRow};
use crate::table::Table;
use crate::utils::cast_from_file_name;

/// Column holding the zero-padded cast number in per-cast tables
pub const CAST_COLUMN: &str = "Cast";

/// A parsed bottle file
#[derive(Debug, Clone, Serialize)]
pub struct BottleFile {
    pub file_name: String,
    pub cast: String,
    pub metadata: HeaderMetadata,
    pub layout: ColumnLayout,
    pub rows: Vec<SampleRow>,
}

impl BottleFile {
    pub fn cruise_id(&self) -> Option<&str> {
        self.metadata.get(HeaderField::CruiseId)
    }

    pub fn start_time(&self) -> Option<&str> {
        self.metadata.get(HeaderField::StartTimeUtc)
    }

    pub fn start_latitude(&self) -> Option<&str> {
        self.metadata.get(HeaderField::StartLatitude)
    }

    pub fn start_longitude(&self) -> Option<&str> {
        self.metadata.get(HeaderField::StartLongitude)
    }

    /// Hex file name recorded in the header
    pub fn source_filename(&self) -> Option<&str> {
        self.metadata.get(HeaderField::Filename)
    }

    /// Per-cast table: layout columns, then the header fields present, then `Cast`
    pub fn to_table(&self) -> Table {
        let fields: Vec<HeaderField> = self.metadata.iter().map(|(f, _)| f).collect();

        let mut columns: Vec<String> = self.layout.names().to_vec();
        columns.extend(fields.iter().map(|f| f.column_name().to_string()));
        columns.push(CAST_COLUMN.to_string());

        let mut table = Table::new(columns);
        for row in &self.rows {
            let mut cells: Vec<Option<String>> =
                row.values.iter().map(|v| Some(v.clone())).collect();
            cells.extend(
                fields
                    .iter()
                    .map(|f| row.metadata.get(*f).map(str::to_string)),
            );
            cells.push(Some(row.cast.clone()));
            table.push_row(cells);
        }

        table
    }
}

/// Parser for instrument-generated bottle summary files
#[derive(Debug, Default, Clone, Copy)]
pub struct BottleFileParser;

impl BottleFileParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a bottle file from disk
    pub fn parse_path(&self, path: &Path) -> Result<BottleFile, BottleParseError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BottleParseError::InvalidFileName(path.display().to_string()))?;

        info!("Parsing bottle file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.parse_str(file_name, &content)
    }

    /// Parse bottle file content; `file_name` supplies the cast number
    pub fn parse_str(&self, file_name: &str, content: &str) -> Result<BottleFile, BottleParseError> {
        let cast = cast_from_file_name(file_name)
            .ok_or_else(|| BottleParseError::InvalidFileName(file_name.to_string()))?;

        let classified = classify_lines(content);
        debug!(
            "{}: {} header, {} column header, {} data lines",
            file_name,
            classified.header.len(),
            classified.columns.len(),
            classified.data.len()
        );

        let metadata = parse_header(&classified.header)?;
        let layout = ColumnLayout::from_lines(&classified.columns);
        let rows = build_rows(&classified.data, &layout, &metadata, &cast)?;

        info!(
            "Parsed {} bottles from {} (cast {})",
            rows.len(),
            file_name,
            cast
        );

        Ok(BottleFile {
            file_name: file_name.to_string(),
            cast,
            metadata,
            layout,
            rows,
        })
    }
}
