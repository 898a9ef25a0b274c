use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::ServiceError;
use crate::bottle::BottleFileParser;
use crate::config::Config;
use crate::importers::ChannelNameMap;
use crate::table::Table;

pub const BOTTLE_EXTENSION: &str = "btl";
pub const CAST_SUMMARY_EXTENSION: &str = "sum";
pub const CTD_SUMMARY_FILE: &str = "CTD_Summary.csv";

/// Outcome of a bottle directory run
#[derive(Debug, Default, Clone)]
pub struct BottleRunStats {
    pub files_found: usize,
    pub files_parsed: usize,
    pub bottles: usize,
    /// Files skipped because they failed to parse, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Turns a directory of `.btl` files into per-cast tables and the cruise CTD table
pub struct BottleService {
    parser: BottleFileParser,
    name_map: Option<ChannelNameMap>,
    skip_invalid_files: bool,
}

impl BottleService {
    pub fn new(name_map: Option<ChannelNameMap>, skip_invalid_files: bool) -> Self {
        Self {
            parser: BottleFileParser::new(),
            name_map,
            skip_invalid_files,
        }
    }

    /// Build from configuration, loading the channel name map when one is set
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let name_map = match &config.name_map {
            Some(path) => Some(ChannelNameMap::load(path)?),
            None => {
                warn!("No channel name map configured, CTD columns keep their short names");
                None
            }
        };
        Ok(Self::new(name_map, config.skip_invalid_files))
    }

    /// `.btl` files in `dir` (any case), sorted by name
    pub fn list_bottle_files(dir: &Path) -> Result<Vec<PathBuf>, ServiceError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(BOTTLE_EXTENSION))
            })
            .collect();
        files.sort();
        debug!("Found {} bottle files in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Parse one bottle file and write its per-cast table next to it as `<stem>.sum`
    pub fn process_file(&self, path: &Path) -> Result<Table, ServiceError> {
        let bottle_file = self
            .parser
            .parse_path(path)
            .map_err(|source| ServiceError::BottleFile {
                path: path.to_path_buf(),
                source,
            })?;

        let table = bottle_file.to_table();
        let summary_path = path.with_extension(CAST_SUMMARY_EXTENSION);
        table.write_csv(&summary_path)?;
        debug!("Wrote {}", summary_path.display());

        Ok(table)
    }

    /// Process `files` in order, calling `on_file` before each one
    ///
    /// Returns the concatenated per-cast tables with channel names mapped to
    /// their full names.
    pub fn process_files<F>(
        &self,
        files: &[PathBuf],
        mut on_file: F,
    ) -> Result<(Table, BottleRunStats), ServiceError>
    where
        F: FnMut(&Path),
    {
        let mut stats = BottleRunStats {
            files_found: files.len(),
            ..BottleRunStats::default()
        };
        let mut tables = Vec::with_capacity(files.len());

        for path in files {
            on_file(path);
            match self.process_file(path) {
                Ok(table) => {
                    stats.files_parsed += 1;
                    stats.bottles += table.len();
                    tables.push(table);
                }
                Err(e) if self.skip_invalid_files => {
                    error!("Skipping {}: {}", path.display(), e);
                    stats.failed.push((path.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        let mut ctd = Table::concat(tables);
        if let Some(name_map) = &self.name_map {
            name_map.apply(&mut ctd);
        }
        Ok((ctd, stats))
    }

    pub fn write_ctd_summary(&self, ctd: &Table, dir: &Path) -> Result<PathBuf, ServiceError> {
        let path = dir.join(CTD_SUMMARY_FILE);
        ctd.write_csv(&path)?;
        info!("Wrote {} CTD bottles to {}", ctd.len(), path.display());
        Ok(path)
    }

    /// Process every bottle file in `dir` and write `CTD_Summary.csv` there
    ///
    /// `on_file` is called before each file with the number of files found.
    #[instrument(skip(self, on_file), fields(dir = %dir.display()))]
    pub fn process_directory<F>(
        &self,
        dir: &Path,
        mut on_file: F,
    ) -> Result<(Table, BottleRunStats), ServiceError>
    where
        F: FnMut(&Path, usize),
    {
        let start_time = Instant::now();
        let files = Self::list_bottle_files(dir)?;
        if files.is_empty() {
            return Err(ServiceError::NoBottleFiles(dir.to_path_buf()));
        }
        info!("Found {} bottle files", files.len());

        let total = files.len();
        let (ctd, stats) = self.process_files(&files, |path| {
            debug!("Processing {}", path.display());
            on_file(path, total);
        })?;
        self.write_ctd_summary(&ctd, dir)?;

        info!(
            "Processed {}/{} bottle files ({} bottles) in {:.2}s",
            stats.files_parsed,
            stats.files_found,
            stats.bottles,
            start_time.elapsed().as_secs_f64()
        );
        Ok((ctd, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_bottle_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b002.btl", "a001.BTL", "a001.sum", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let files = BottleService::list_bottle_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a001.BTL", "b002.btl"]);
    }

    #[test]
    fn test_process_directory_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a001.btl", "a002.btl"] {
            std::fs::write(dir.path().join(name), "Bottle  Date\nPosition  Time\n").unwrap();
        }

        let mut seen = Vec::new();
        let service = BottleService::new(None, false);
        let (ctd, stats) = service
            .process_directory(dir.path(), |path, total| {
                seen.push((path.file_name().unwrap().to_owned(), total));
            })
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "a001.btl");
        assert!(seen.iter().all(|(_, total)| *total == 2));
        assert_eq!(stats.files_parsed, 2);
        assert!(ctd.is_empty());
        assert!(dir.path().join(CTD_SUMMARY_FILE).exists());
    }

    #[test]
    fn test_process_directory_without_bottle_files() {
        let dir = tempfile::tempdir().unwrap();
        let service = BottleService::new(None, false);
        assert!(matches!(
            service.process_directory(dir.path(), |_, _| {}),
            Err(ServiceError::NoBottleFiles(_))
        ));
    }
}
