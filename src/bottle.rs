// Bottle file module
//
// Parses the `.btl` text files written by the CTD processing software.
// A file contains:
// - `*` header lines: instrument metadata (start time, position, cruise id)
// - `#` lines: processing history, ignored
// - column name lines, one table column per fixed-width block
// - data lines: `(avg)` value lines each followed by an `(sdev)` line

pub mod column_layout;
pub mod error;
pub mod header_parser;
pub mod line_classifier;
pub mod parser;
pub mod row_builder;

pub use column_layout::ColumnLayout;
pub use error::BottleParseError;
pub use header_parser::{HeaderField, HeaderMetadata};
pub use parser::{BottleFile, BottleFileParser};
pub use row_builder::SampleRow;
