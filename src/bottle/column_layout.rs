use serde::Serialize;

use crate::bottle::line_classifier::NumberedLine;

/// Positional column names of a bottle file
///
/// Built from one or more column header lines. Tokens sharing a position
/// across lines are joined with a single space in line order, so
/// `Bottle` over `Position` becomes `Bottle Position`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    names: Vec<String>,
}

impl ColumnLayout {
    pub fn from_lines(lines: &[NumberedLine]) -> Self {
        let mut names: Vec<String> = Vec::new();

        for line in lines {
            for (idx, token) in line.text.split_whitespace().enumerate() {
                match names.get_mut(idx) {
                    Some(name) => {
                        name.push(' ');
                        name.push_str(token);
                    }
                    None => names.push(token.to_string()),
                }
            }
        }

        Self { names }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i, n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<NumberedLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| NumberedLine {
                number: i + 1,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_two_line_header() {
        let layout = ColumnLayout::from_lines(&lines(&["Bottle  Date", "Position  Time"]));
        assert_eq!(layout.width(), 2);
        assert_eq!(layout.name(0), Some("Bottle Position"));
        assert_eq!(layout.name(1), Some("Date Time"));
    }

    #[test]
    fn test_three_line_header_concatenates_in_order() {
        let layout = ColumnLayout::from_lines(&lines(&["a  b  c", "d  e", "f"]));
        assert_eq!(layout.names(), &["a d f", "b e", "c"]);
    }

    #[test]
    fn test_single_line_header() {
        let layout =
            ColumnLayout::from_lines(&lines(&["Bottle Date PrDM T090C C0S/m Sal00"]));
        assert_eq!(layout.width(), 6);
        assert_eq!(layout.name(5), Some("Sal00"));
        assert_eq!(layout.name(6), None);
    }

    #[test]
    fn test_later_line_wider_than_first() {
        let layout = ColumnLayout::from_lines(&lines(&["Bottle", "Position  Time"]));
        assert_eq!(layout.names(), &["Bottle Position", "Time"]);
    }

    #[test]
    fn test_empty_layout() {
        let layout = ColumnLayout::from_lines(&[]);
        assert_eq!(layout.width(), 0);
        assert_eq!(layout.iter().count(), 0);
    }
}
