use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::bottle::column_layout::ColumnLayout;
use crate::bottle::error::BottleParseError;
use crate::bottle::header_parser::HeaderMetadata;
use crate::bottle::line_classifier::NumberedLine;

pub const AVG_SUFFIX: &str = "(avg)";
pub const SDEV_SUFFIX: &str = "(sdev)";

/// Column holding the bottle closure date on `(avg)` lines and its time on `(sdev)` lines
pub const DATE_TIME_INDEX: usize = 1;

static VALUE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}|\t").expect("value separator regex is valid"));

/// One bottle closure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    /// Values in column layout order
    pub values: Vec<String>,
    pub metadata: HeaderMetadata,
    /// Zero-padded 3 digit cast number
    pub cast: String,
}

impl SampleRow {
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Combined `<date> <time>` of the bottle closure
    pub fn date_time(&self) -> Option<&str> {
        self.value(DATE_TIME_INDEX)
    }
}

/// Split a data line body on runs of two or more spaces or on tabs
///
/// Single spaces are kept inside values (`Sep 27 2016` stays one value).
pub fn split_values(body: &str) -> Vec<&str> {
    VALUE_SEPARATOR
        .split(body)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug)]
struct PendingRow {
    line: usize,
    values: Vec<String>,
}

/// Build one row per `(avg)` line, completing each with the time from its `(sdev)` line
///
/// Lines with other statistics such as `(min)` or `(max)` are skipped.
pub fn build_rows(
    lines: &[NumberedLine],
    layout: &ColumnLayout,
    metadata: &HeaderMetadata,
    cast: &str,
) -> Result<Vec<SampleRow>, BottleParseError> {
    let mut rows = Vec::new();
    let mut pending: Option<PendingRow> = None;

    for line in lines {
        if let Some(body) = line.text.strip_suffix(AVG_SUFFIX) {
            if let Some(unpaired) = pending.take() {
                return Err(BottleParseError::MissingSdev {
                    line: unpaired.line,
                });
            }

            let values = split_values(body);
            if values.len() != layout.width() {
                return Err(BottleParseError::ColumnCountMismatch {
                    line: line.number,
                    expected: layout.width(),
                    found: values.len(),
                });
            }

            pending = Some(PendingRow {
                line: line.number,
                values: values.into_iter().map(str::to_string).collect(),
            });
        } else if let Some(body) = line.text.strip_suffix(SDEV_SUFFIX) {
            let mut row = pending
                .take()
                .ok_or(BottleParseError::UnmatchedSdev { line: line.number })?;

            let time = split_values(body).into_iter().next().ok_or(
                BottleParseError::ColumnCountMismatch {
                    line: line.number,
                    expected: 1,
                    found: 0,
                },
            )?;

            if let Some(date) = row.values.get_mut(DATE_TIME_INDEX) {
                date.push(' ');
                date.push_str(time);
            }

            rows.push(SampleRow {
                values: row.values,
                metadata: metadata.clone(),
                cast: cast.to_string(),
            });
        } else {
            debug!("Skipping data line {}: {}", line.number, line.text);
        }
    }

    if let Some(unpaired) = pending {
        return Err(BottleParseError::MissingSdev {
            line: unpaired.line,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<NumberedLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| NumberedLine {
                number: i + 10,
                text: t.to_string(),
            })
            .collect()
    }

    fn layout(header: &[&str]) -> ColumnLayout {
        ColumnLayout::from_lines(&lines(header))
    }

    #[test]
    fn test_split_values() {
        assert_eq!(
            split_values("1    Sep 27 2016     1102.535\t4.2233  "),
            vec!["1", "Sep 27 2016", "1102.535", "4.2233"]
        );
    }

    #[test]
    fn test_avg_sdev_pair_makes_one_row() {
        let layout = layout(&["Bottle  Date", "Position  Time"]);
        let data = lines(&["1        Sep 21 2016      (avg)", "14:23:00      (sdev)"]);

        let rows = build_rows(&data, &layout, &HeaderMetadata::default(), "002").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value(0), Some("1"));
        assert_eq!(rows[0].date_time(), Some("Sep 21 2016 14:23:00"));
        assert_eq!(rows[0].cast, "002");
    }

    #[test]
    fn test_row_count_matches_avg_lines() {
        let layout = layout(&["Bottle  Date  PrDM  T090C", "Position  Time"]);
        let data = lines(&[
            "1    Sep 27 2016   1102.535    4.2233 (avg)",
            "18:41:18      0.139    0.0001 (sdev)",
            "2    Sep 27 2016    500.100    6.1000 (avg)",
            "18:50:02      0.101    0.0002 (sdev)",
            "3    Sep 27 2016     10.002   14.9870 (avg)",
            "19:01:45      0.120    0.0040 (sdev)",
        ]);

        let rows = build_rows(&data, &layout, &HeaderMetadata::default(), "001").unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].values, vec!["2", "Sep 27 2016 18:50:02", "500.100", "6.1000"]);
        assert_eq!(rows[2].date_time(), Some("Sep 27 2016 19:01:45"));
    }

    #[test]
    fn test_other_statistics_are_skipped() {
        let layout = layout(&["Bottle  Date  PrDM"]);
        let data = lines(&[
            "1    Sep 27 2016   1102.535 (avg)",
            "18:41:18      0.139 (sdev)",
            "1101.9   (min)",
            "1103.1   (max)",
        ]);

        let rows = build_rows(&data, &layout, &HeaderMetadata::default(), "001").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unmatched_sdev_is_fatal() {
        let layout = layout(&["Bottle  Date"]);
        let data = lines(&["18:41:18      0.139 (sdev)"]);

        let result = build_rows(&data, &layout, &HeaderMetadata::default(), "001");
        assert!(matches!(result, Err(BottleParseError::UnmatchedSdev { line: 10 })));
    }

    #[test]
    fn test_avg_without_sdev_is_fatal() {
        let layout = layout(&["Bottle  Date"]);
        let data = lines(&[
            "1    Sep 27 2016 (avg)",
            "2    Sep 27 2016 (avg)",
            "18:41:18 (sdev)",
        ]);

        let result = build_rows(&data, &layout, &HeaderMetadata::default(), "001");
        assert!(matches!(result, Err(BottleParseError::MissingSdev { line: 10 })));
    }

    #[test]
    fn test_trailing_avg_without_sdev_is_fatal() {
        let layout = layout(&["Bottle  Date"]);
        let data = lines(&["1    Sep 27 2016 (avg)"]);

        let result = build_rows(&data, &layout, &HeaderMetadata::default(), "001");
        assert!(matches!(result, Err(BottleParseError::MissingSdev { line: 10 })));
    }

    #[test]
    fn test_value_count_must_match_layout() {
        let layout = layout(&["Bottle  Date  PrDM"]);
        let data = lines(&["1    Sep 27 2016 (avg)", "18:41:18 (sdev)"]);

        match build_rows(&data, &layout, &HeaderMetadata::default(), "001") {
            Err(BottleParseError::ColumnCountMismatch {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 10);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("Expected ColumnCountMismatch, got {other:?}"),
        }
    }
}
