/// Bottle file header parser
///
/// Extracts the cast start time, hex file name, start position and cruise id
/// from the `*`/`#` header block written by the CTD processing software.
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::bottle::error::BottleParseError;
use crate::bottle::line_classifier::NumberedLine;

/// Output format for the cast start time
pub const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formats accepted for the `NMEA UTC (Time)` header value
const TIMESTAMP_FORMATS: &[&str] = &[
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

/// Semantic keys extracted from a bottle file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HeaderField {
    StartTimeUtc,
    Filename,
    StartLatitude,
    StartLongitude,
    CruiseId,
}

impl HeaderField {
    /// Markers in match priority order
    pub const ALL: [HeaderField; 5] = [
        HeaderField::StartTimeUtc,
        HeaderField::Filename,
        HeaderField::StartLatitude,
        HeaderField::StartLongitude,
        HeaderField::CruiseId,
    ];

    /// Lowercase text identifying the header line
    pub fn marker(self) -> &'static str {
        match self {
            HeaderField::StartTimeUtc => "nmea utc",
            HeaderField::Filename => "filename",
            HeaderField::StartLatitude => "nmea latitude",
            HeaderField::StartLongitude => "nmea longitude",
            HeaderField::CruiseId => "cruise id",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            HeaderField::StartTimeUtc => "StartTimeUTC",
            HeaderField::Filename => "Filename",
            HeaderField::StartLatitude => "StartLatitude",
            HeaderField::StartLongitude => "StartLongitude",
            HeaderField::CruiseId => "CruiseId",
        }
    }

    /// Column name used for this field in per-cast tables
    pub fn column_name(self) -> &'static str {
        match self {
            HeaderField::StartTimeUtc => "Start Time [UTC]",
            HeaderField::Filename => "Filename",
            HeaderField::StartLatitude => "Start Latitude [degrees]",
            HeaderField::StartLongitude => "Start Longitude [degrees]",
            HeaderField::CruiseId => "Cruise",
        }
    }

    fn separators(self) -> &'static [char] {
        match self {
            HeaderField::StartTimeUtc => &['=', '['],
            HeaderField::CruiseId => &[':'],
            _ => &['='],
        }
    }

    fn matches(self, lowercase_line: &str) -> bool {
        lowercase_line.contains(self.marker())
    }
}

/// Metadata extracted from a bottle file header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderMetadata {
    fields: BTreeMap<HeaderField, String>,
}

impl HeaderMetadata {
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HeaderField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Store a value unless the field was already set; returns whether it was stored
    fn set_once(&mut self, field: HeaderField, value: String) -> bool {
        if self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, value);
        true
    }
}

/// Parse header lines into metadata
///
/// Each line is tested against the markers in priority order and only the
/// first matching marker is used. The first occurrence of a field wins.
pub fn parse_header(lines: &[NumberedLine]) -> Result<HeaderMetadata, BottleParseError> {
    let mut metadata = HeaderMetadata::default();

    for line in lines {
        let lowercase = line.text.to_lowercase();
        let Some(field) = HeaderField::ALL.into_iter().find(|f| f.matches(&lowercase)) else {
            continue;
        };

        if metadata.get(field).is_some() {
            debug!(
                "Ignoring repeated '{}' header at line {}",
                field.marker(),
                line.number
            );
            continue;
        }

        let raw = second_segment(&line.text, field.separators()).ok_or(
            BottleParseError::MissingHeaderValue {
                marker: field.marker(),
                line: line.number,
            },
        )?;

        let value = match field {
            HeaderField::StartTimeUtc => format_start_time(raw)?,
            _ => raw.to_string(),
        };

        debug!("Header {} = {}", field.key(), value);
        metadata.set_once(field, value);
    }

    Ok(metadata)
}

/// Second segment of `line` split on any of `separators`, trimmed
fn second_segment<'a>(line: &'a str, separators: &[char]) -> Option<&'a str> {
    line.split(|c: char| separators.contains(&c))
        .nth(1)
        .map(str::trim)
}

/// Parse a header timestamp and reformat it as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_start_time(value: &str) -> Result<String, BottleParseError> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.format(START_TIME_FORMAT).to_string())
        .ok_or_else(|| BottleParseError::InvalidTimestamp(value.to_string()))
}
