use crate::{
    output::{error::OutputError, local::local_output},
    prefetch::record::PrefetchRecord,
    structs::toml::Output,
};
use log::{error, info};

/// Output records as `jsonl`, one record per line
pub(crate) fn jsonl_format(
    records: &[PrefetchRecord],
    output_name: &str,
    output: &Output,
) -> Result<(), OutputError> {
    let mut collection_data = Vec::new();
    for record in records {
        if let Err(err) = serde_json::to_writer(&mut collection_data, record) {
            error!("[core] Failed to serialize {output_name} jsonl entry: {err:?}");
            return Err(OutputError::Serialize);
        }
        collection_data.push(b'\n');
    }

    let output_result = local_output(&collection_data, output, output_name, "jsonl");
    match output_result {
        Ok(_) => info!("[core] {output_name} jsonl output success"),
        Err(err) => {
            error!("[core] Failed to output {output_name} jsonl: {err:?}");
            return Err(err);
        }
    }

    Ok(())
}
