/// A trimmed line of a bottle file together with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub number: usize,
    pub text: String,
}

/// Lines of a bottle file split into header, column header and data sections
#[derive(Debug, Default, Clone)]
pub struct ClassifiedLines {
    pub header: Vec<NumberedLine>,
    pub columns: Vec<NumberedLine>,
    pub data: Vec<NumberedLine>,
}

/// Partition bottle file content by the first character of each trimmed line
///
/// - `*` or `#` → header
/// - decimal digit → data
/// - anything else → column header
///
/// A data line whose first token is not numeric ends up with the column
/// headers. Blank lines are dropped.
pub fn classify_lines(content: &str) -> ClassifiedLines {
    let mut classified = ClassifiedLines::default();

    for (idx, raw) in content.lines().enumerate() {
        let text = raw.trim();
        let Some(first) = text.chars().next() else {
            continue;
        };

        let line = NumberedLine {
            number: idx + 1,
            text: text.to_string(),
        };

        if first == '*' || first == '#' {
            classified.header.push(line);
        } else if first.is_ascii_digit() {
            classified.data.push(line);
        } else {
            classified.columns.push(line);
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[NumberedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_classify_sections() {
        let content = "* Sea-Bird SBE 9 Data File:\n\
                       # nvalues = 12\n\
                       \x20   Bottle        Date\n\
                       \x20 Position        Time\n\
                       \x20     1    Sep 27 2016   (avg)\n\
                       \x20           18:25:41   (sdev)\n";
        let classified = classify_lines(content);

        assert_eq!(
            texts(&classified.header),
            vec!["* Sea-Bird SBE 9 Data File:", "# nvalues = 12"]
        );
        assert_eq!(
            texts(&classified.columns),
            vec!["Bottle        Date", "Position        Time"]
        );
        assert_eq!(
            texts(&classified.data),
            vec!["1    Sep 27 2016   (avg)", "18:25:41   (sdev)"]
        );
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let classified = classify_lines("* a\n\nBottle\n3  x (avg)");
        assert_eq!(classified.header[0].number, 1);
        assert_eq!(classified.columns[0].number, 3);
        assert_eq!(classified.data[0].number, 4);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let classified = classify_lines("\n   \n\t\n");
        assert!(classified.header.is_empty());
        assert!(classified.columns.is_empty());
        assert!(classified.data.is_empty());
    }

    #[test]
    fn test_non_numeric_data_line_is_column_header() {
        // Syntactic classification only
        let classified = classify_lines("x1    Sep 27 2016   (avg)");
        assert_eq!(classified.columns.len(), 1);
        assert!(classified.data.is_empty());
    }

    #[test]
    fn test_signed_value_is_not_data() {
        let classified = classify_lines("-1.5   2.0");
        assert_eq!(classified.columns.len(), 1);
    }
}
