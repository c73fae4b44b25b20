use crate::{
    output::{error::OutputError, local::local_output},
    prefetch::record::PrefetchRecord,
    structs::toml::Output,
};
use log::{error, info};

/// Output all records as one `json` array
pub(crate) fn json_format(
    records: &[PrefetchRecord],
    output_name: &str,
    output: &Output,
) -> Result<(), OutputError> {
    let serde_data = match serde_json::to_vec(records) {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to serialize {output_name} json: {err:?}");
            return Err(OutputError::Serialize);
        }
    };

    let output_result = local_output(&serde_data, output, output_name, "json");
    match output_result {
        Ok(_) => info!("[core] {output_name} json output success"),
        Err(err) => {
            error!("[core] Failed to output {output_name} json: {err:?}");
            return Err(err);
        }
    }

    Ok(())
}
