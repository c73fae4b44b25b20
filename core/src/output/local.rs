use super::error::OutputError;
use crate::structs::toml::Output;
use log::error;
use std::{
    fs::{create_dir_all, OpenOptions},
    io::Write,
};

/// Directory all output for a collection is written to
pub(crate) fn output_directory(output: &Output) -> Result<String, OutputError> {
    let output_path = format!("{}/{}", output.directory, output.name);

    let result = create_dir_all(&output_path);
    match result {
        Ok(_) => Ok(output_path),
        Err(err) => {
            error!("[core] Failed to create output directory for {output_path}. Error: {err:?}");
            Err(OutputError::CreateDirectory)
        }
    }
}

/// Output to local directory provided by TOML input
pub(crate) fn local_output(
    data: &[u8],
    output: &Output,
    output_name: &str,
    extension: &str,
) -> Result<(), OutputError> {
    let output_path = output_directory(output)?;

    let file_result = OpenOptions::new()
        .append(true)
        .create(true)
        .open(format!("{output_path}/{output_name}.{extension}"));

    let mut output_file = match file_result {
        Ok(results) => results,
        Err(err) => {
            error!(
                "[core] Failed to create output file {output_name} at {output_path}. Error: {err:?}"
            );
            return Err(OutputError::CreateFile);
        }
    };

    let write_result = output_file.write_all(data);
    match write_result {
        Ok(_) => {}
        Err(err) => {
            error!(
                "[core] Failed to write output to file {output_name} at {output_path}. Error: {err:?}",
            );
            return Err(OutputError::WriteJson);
        }
    }
    Ok(())
}
