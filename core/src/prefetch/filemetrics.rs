use super::{
    filenames::{filename_block, metric_filename},
    header::FormatVersion,
    versions::version::SectionDescriptors,
};
use crate::utils::nom_helper::{
    nom_data_at, nom_unsigned_eight_bytes, nom_unsigned_four_bytes, nom_unsigned_two_bytes, Endian,
};
use log::warn;
use serde::Serialize;
use std::fmt;

/// NTFS file reference. 48 bit MFT entry and 16 bit sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MftReference {
    pub entry: u64,
    pub sequence: u16,
}

impl MftReference {
    pub fn from_value(value: u64) -> MftReference {
        MftReference {
            entry: value & 0xffff_ffff_ffff,
            sequence: (value >> 48) as u16,
        }
    }
}

impl fmt::Display for MftReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.entry, self.sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceChain {
    pub next_array_entry_index: u32,
    pub total_block_load_count: u32,
    /**Only Windows 8 and newer */
    pub loaded_block_count: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetric {
    pub start_time: u32,
    pub duration: u32,
    /**Not in Windows XP */
    pub average_duration: Option<u32>,
    pub filename_offset: u32,
    /**Characters, not bytes */
    pub filename_length: u32,
    pub flags: u32,
    /**Not in Windows XP */
    pub mft_reference: Option<MftReference>,
    pub trace_chain: Option<TraceChain>,
    /**Resolved from the filename strings using this metric's own offset and length */
    pub filename: Option<String>,
}

/// Parse the file metrics array and attach each metric's trace chain and filename.
/// The whole array is dropped if it does not fit in the data
pub(crate) fn read_file_metrics(
    data: &[u8],
    descriptors: &SectionDescriptors,
    version: &FormatVersion,
) -> Vec<FileMetric> {
    let count = descriptors.file_metrics_count as u64;
    let metrics_size = count * version.metric_size() as u64;
    let metrics_result = nom_data_at(data, descriptors.file_metrics_offset as u64, metrics_size);
    let (remaining, metrics_data) = match metrics_result {
        Ok(result) => result,
        Err(err) => {
            warn!(
                "[prefetch] File metrics array ({} entries) is out of bounds: {err:?}",
                descriptors.file_metrics_count
            );
            return Vec::new();
        }
    };

    let mut metrics = Vec::new();
    for entry in metrics_data.chunks_exact(version.metric_size()) {
        match parse_metric(entry, version) {
            Ok((_, metric)) => metrics.push(metric),
            Err(err) => {
                warn!("[prefetch] Could not parse file metric: {err:?}");
                return Vec::new();
            }
        }
    }

    // Trace chains directly follow the metrics, one for each metric
    let chains_size = count * version.trace_chain_size() as u64;
    match nom_data_at(remaining, 0, chains_size) {
        Ok((_, chains_data)) => {
            let chains = chains_data.chunks_exact(version.trace_chain_size());
            for (metric, entry) in metrics.iter_mut().zip(chains) {
                if let Ok((_, chain)) = parse_trace_chain(entry, version) {
                    metric.trace_chain = Some(chain);
                }
            }
        }
        Err(err) => {
            warn!("[prefetch] Trace chain array is out of bounds: {err:?}");
        }
    }

    if let Some(block) = filename_block(data, descriptors) {
        for metric in metrics.iter_mut() {
            metric.filename = metric_filename(block, metric.filename_offset, metric.filename_length);
        }
    }

    metrics
}

fn parse_metric<'a>(data: &'a [u8], version: &FormatVersion) -> nom::IResult<&'a [u8], FileMetric> {
    let legacy = *version == FormatVersion::Xp2003;

    let (input, start_time) = nom_unsigned_four_bytes(data, Endian::Le)?;
    let (mut input, duration) = nom_unsigned_four_bytes(input, Endian::Le)?;

    let mut average_duration = None;
    if !legacy {
        let (remaining, average) = nom_unsigned_four_bytes(input, Endian::Le)?;
        average_duration = Some(average);
        input = remaining;
    }

    let (input, filename_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, filename_length) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (mut input, flags) = nom_unsigned_four_bytes(input, Endian::Le)?;

    let mut mft_reference = None;
    if !legacy {
        let (remaining, reference) = nom_unsigned_eight_bytes(input, Endian::Le)?;
        mft_reference = Some(MftReference::from_value(reference));
        input = remaining;
    }

    let metric = FileMetric {
        start_time,
        duration,
        average_duration,
        filename_offset,
        filename_length,
        flags,
        mft_reference,
        trace_chain: None,
        filename: None,
    };
    Ok((input, metric))
}

fn parse_trace_chain<'a>(
    data: &'a [u8],
    version: &FormatVersion,
) -> nom::IResult<&'a [u8], TraceChain> {
    let (input, next_array_entry_index) = nom_unsigned_four_bytes(data, Endian::Le)?;
    let (input, total_block_load_count) = nom_unsigned_four_bytes(input, Endian::Le)?;

    let (input, loaded_block_count) = match version {
        FormatVersion::Xp2003 | FormatVersion::Vista7 => {
            let (input, _unknown) = nom_unsigned_four_bytes(input, Endian::Le)?;
            (input, None)
        }
        _ => {
            let (input, _unknown) = nom_unsigned_two_bytes(input, Endian::Le)?;
            let (input, loaded) = nom_unsigned_two_bytes(input, Endian::Le)?;
            (input, Some(loaded))
        }
    };

    let chain = TraceChain {
        next_array_entry_index,
        total_block_load_count,
        loaded_block_count,
    };
    Ok((input, chain))
}
