use crate::{
    output::{error::OutputError, local::output_directory},
    prefetch::{
        record::{PrefetchRecord, PrefetchRow},
        resolve::DriveResolver,
    },
    structs::toml::Output,
};
use log::{error, info};
use rusqlite::{params, Connection, Error};

const PREFETCH_TABLE: &str = "CREATE TABLE IF NOT EXISTS prefetch_data (filename TEXT NOT NULL, executable_name TEXT NOT NULL, hash TEXT NOT NULL, run_count INTEGER, last_executed TEXT, run_times TEXT NOT NULL, volumes TEXT NOT NULL, directories TEXT NOT NULL, resources TEXT NOT NULL, created_on TEXT, modified_on TEXT, accessed_on TEXT, PRIMARY KEY(filename, hash))";

/// Output records to a `sqlite` database. Returns the number of new rows
pub(crate) fn sqlite_format(
    records: &[PrefetchRecord],
    resolver: &dyn DriveResolver,
    output_name: &str,
    output: &Output,
) -> Result<usize, OutputError> {
    let output_path = output_directory(output)?;
    let path = format!("{output_path}/{output_name}.db");

    let rows: Vec<PrefetchRow> = records
        .iter()
        .map(|record| record.to_row(resolver))
        .collect();

    let insert_result = insert_prefetch_rows(&rows, &path);
    match insert_result {
        Ok(inserted) => {
            info!(
                "[core] {output_name} sqlite output success. {inserted} new of {} rows",
                rows.len()
            );
            Ok(inserted)
        }
        Err(err) => {
            error!("[core] Failed to output {output_name} to sqlite {path}: {err:?}");
            Err(OutputError::Sqlite)
        }
    }
}

/// Insert rows into the `prefetch_data` table at path. Rows whose (filename, hash) already exists are skipped
pub(crate) fn insert_prefetch_rows(rows: &[PrefetchRow], path: &str) -> Result<usize, Error> {
    let connection = Connection::open(path)?;
    connection.execute(PREFETCH_TABLE, ())?;

    let query = "INSERT OR IGNORE INTO prefetch_data(filename, executable_name, hash, run_count, last_executed, run_times, volumes, directories, resources, created_on, modified_on, accessed_on) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
    let mut cache = connection.prepare_cached(query)?;

    let status = connection.unchecked_transaction()?;
    let mut inserted = 0;
    for row in rows {
        inserted += cache.execute(params![
            row.filename,
            row.executable_name,
            row.hash,
            row.run_count,
            row.last_executed,
            row.run_times,
            row.volumes,
            row.directories,
            row.resources,
            row.created_on,
            row.modified_on,
            row.accessed_on,
        ])?;
    }

    status.commit()?;
    Ok(inserted)
}
