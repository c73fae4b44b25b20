/**
 * `Prefetch` data tracks execution of applications on Windows Workstations
 * `Prefetch` is disabled on Windows Servers and may be disabled on systems with SSDs
 *
 * References:
 *  `https://github.com/libyal/libscca/blob/main/documentation/Windows%20Prefetch%20File%20(PF)%20format.asciidoc`
 */
use super::{error::PrefetchError, pf::parse_prefetch, record::PrefetchRecord};
use crate::{
    filesystem::files::{file_extension, list_files, read_file},
    structs::artifacts::PrefetchOptions,
    utils::environment::get_systemdrive,
};
use log::{error, info};
use serde::Serialize;

/// Results of parsing a directory of prefetch files
#[derive(Debug, Default, Serialize)]
pub struct PrefetchCollection {
    pub records: Vec<PrefetchRecord>,
    /**Paths that could not be read or parsed */
    pub failed: Vec<String>,
}

impl PrefetchCollection {
    pub fn total(&self) -> usize {
        self.records.len() + self.failed.len()
    }

    pub fn fully_parsed(&self) -> usize {
        self.records
            .iter()
            .filter(|record| !record.parsing_error)
            .count()
    }

    pub fn with_warnings(&self) -> usize {
        self.records.len() - self.fully_parsed()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} fully parsed, {} with warnings, {} failed",
            self.fully_parsed(),
            self.total(),
            self.with_warnings(),
            self.failed.len()
        )
    }
}

/// Parse `Prefetch` based on `PrefetchOptions`
pub fn grab_prefetch(options: &PrefetchOptions) -> Result<PrefetchCollection, PrefetchError> {
    if let Some(path) = &options.alt_dir {
        return custom_prefetch_path(path);
    }

    let drive = get_systemdrive();
    let path = format!("{drive}:\\Windows\\Prefetch");
    read_directory(&path)
}

/// Read and parse prefetch files at a custom path
pub fn custom_prefetch_path(path: &str) -> Result<PrefetchCollection, PrefetchError> {
    read_directory(path)
}

/// Read all files at provided path
fn read_directory(path: &str) -> Result<PrefetchCollection, PrefetchError> {
    let dir_results = list_files(path);
    let read_dir = match dir_results {
        Ok(result) => result,
        Err(err) => {
            error!("[prefetch] Failed to get prefetch files {path}, error: {err:?}");
            return Err(PrefetchError::ReadDirectory);
        }
    };
    let mut collection = PrefetchCollection::default();

    for pf_file in read_dir {
        // Skip non-prefetch files
        if !file_extension(&pf_file).eq_ignore_ascii_case("pf") {
            continue;
        }

        let prefetch_results = parse_prefetch_file(&pf_file);
        match prefetch_results {
            Ok(result) => collection.records.push(result),
            Err(err) => {
                error!("[prefetch] Failed to get prefetch for {pf_file}, error: {err:?}");
                collection.failed.push(pf_file);
            }
        }
    }

    info!("[prefetch] {path}: {}", collection.summary());
    Ok(collection)
}

/// Read and parse one prefetch file. Reads go through the same size guard as directory parsing
pub fn parse_prefetch_file(path: &str) -> Result<PrefetchRecord, PrefetchError> {
    let buffer_results = read_file(path);
    let buffer = match buffer_results {
        Ok(result) => result,
        Err(err) => {
            error!("[prefetch] Failed to read prefetch file {path}, error: {err:?}");
            return Err(PrefetchError::ReadFile);
        }
    };

    parse_prefetch(&buffer, Some(path))
}
