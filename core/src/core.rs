use crate::{
    filesystem::files::read_file,
    output::{
        error::OutputError,
        formats::{json::json_format, jsonl::jsonl_format, sqlite::sqlite_format},
    },
    prefetch::{
        parser::{grab_prefetch, PrefetchCollection},
        resolve::SerialDriveMap,
    },
    structs::toml::PrefetchToml,
    utils::{error::TomlError, logging::create_log_file},
};
use log::{error, info};
use simplelog::{Config, WriteLogger};

const OUTPUT_NAME: &str = "prefetch";

/// Parse a TOML file at provided path
pub fn parse_toml_file(path: &str) -> Result<PrefetchCollection, TomlError> {
    let buffer_results = read_file(path);
    let buffer = match buffer_results {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Could not read TOML file {path}: {err:?}");
            return Err(TomlError::NoFile);
        }
    };

    parse_toml_data(&buffer)
}

/// Parse an already read TOML file
pub fn parse_toml_data(data: &[u8]) -> Result<PrefetchCollection, TomlError> {
    let collection = PrefetchToml::parse_prefetch_toml(data)?;
    prefetch_collection(&collection)
}

/// Collect and output prefetch files based on the TOML config
pub fn prefetch_collection(collection: &PrefetchToml) -> Result<PrefetchCollection, TomlError> {
    if let Ok((log_file, level)) = create_log_file(&collection.output) {
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }

    let prefetch = match grab_prefetch(&collection.prefetch) {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to collect prefetch: {err:?}");
            return Err(TomlError::Collection);
        }
    };

    let output_result = output_prefetch(&prefetch, collection);
    match output_result {
        Ok(_) => info!("[core] Prefetch collection complete: {}", prefetch.summary()),
        Err(err) => {
            error!("[core] Failed to output prefetch collection: {err:?}");
            return Err(TomlError::Output);
        }
    }
    Ok(prefetch)
}

/// Write the records in the configured output format
fn output_prefetch(
    prefetch: &PrefetchCollection,
    collection: &PrefetchToml,
) -> Result<(), OutputError> {
    let output = &collection.output;
    match output.format.as_str() {
        "json" => json_format(&prefetch.records, OUTPUT_NAME, output),
        "jsonl" => jsonl_format(&prefetch.records, OUTPUT_NAME, output),
        "sqlite" => {
            let resolver = SerialDriveMap::new(&collection.prefetch.drives);
            sqlite_format(&prefetch.records, &resolver, OUTPUT_NAME, output)?;
            Ok(())
        }
        _ => {
            error!("[core] Unknown output format: {}", output.format);
            Err(OutputError::UnknownFormat)
        }
    }
}
