#[derive(Debug, thiserror::Error)]
pub enum BottleParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse header timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Header line {line} has no value for marker '{marker}'")]
    MissingHeaderValue { marker: &'static str, line: usize },

    #[error("Line {line}: expected {expected} values, found {found}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: (sdev) line without a preceding (avg) line")]
    UnmatchedSdev { line: usize },

    #[error("Line {line}: (avg) line is missing its (sdev) line")]
    MissingSdev { line: usize },

    #[error("Cannot derive cast number from file name: {0}")]
    InvalidFileName(String),
}
