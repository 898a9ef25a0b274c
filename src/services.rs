pub mod bottle_service;
pub mod summary_schema;
pub mod summary_service;

use std::path::PathBuf;

use crate::bottle::BottleParseError;
use crate::config::ConfigError;
use crate::importers::SheetError;
use crate::table::TableError;

pub use bottle_service::{BottleRunStats, BottleService};
pub use summary_service::{SummarySources, SummaryService};

/// Error types for cruise processing runs
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to parse bottle file {path}: {source}")]
    BottleFile {
        path: PathBuf,
        #[source]
        source: BottleParseError,
    },

    #[error("No .btl files found in {0}")]
    NoBottleFiles(PathBuf),

    #[error("Cruise id not found in configuration, sampling log or CTD headers")]
    MissingCruiseId,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
