use super::{version17, version23, version26, version30};
use crate::{
    prefetch::{
        error::PrefetchError,
        header::{FormatVersion, HEADER_SIZE},
    },
    utils::{
        nom_helper::{nom_data_at, nom_u32_at, nom_u64_at, nom_unsigned_four_bytes, Endian},
        time::filetime_to_datetime,
    },
};
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::Serialize;

/// Location of the section descriptors. Offsets are absolute within the (decompressed) file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDescriptors {
    pub file_metrics_offset: u32,
    pub file_metrics_count: u32,
    pub trace_chains_offset: u32,
    pub trace_chains_count: u32,
    pub filename_strings_offset: u32,
    pub filename_strings_size: u32,
    pub volumes_offset: u32,
    pub volumes_count: u32,
    pub volumes_size: u32,
    /**Only Windows 8 and newer */
    pub directory_count: Option<u32>,
}

/// Everything read from the file information section
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FileInformation {
    pub(crate) descriptors: SectionDescriptors,
    pub(crate) run_times: Vec<DateTime<Utc>>,
    pub(crate) run_count: u32,
}

/// Where the execution timeline lives. Offsets are relative to the start of the file information section
#[derive(Debug, PartialEq)]
pub(crate) struct TimelineLayout {
    pub(crate) run_times_offset: usize,
    pub(crate) run_time_slots: usize,
    pub(crate) run_count_offset: usize,
}

/// Parse the file information section that follows the header
pub(crate) fn read_file_info_section(
    data: &[u8],
    version: &FormatVersion,
) -> Result<FileInformation, PrefetchError> {
    let section_result = nom_data_at(data, HEADER_SIZE as u64, version.section_size() as u64);
    let section = match section_result {
        Ok((_, result)) => result,
        Err(err) => {
            error!(
                "[prefetch] File information section for version {} is truncated: {err:?}",
                version.value()
            );
            return Err(PrefetchError::FileInfo);
        }
    };

    let descriptors = match SectionDescriptors::parse_descriptors(section, version) {
        Ok((_, result)) => result,
        Err(err) => {
            error!("[prefetch] Could not parse section descriptors: {err:?}");
            return Err(PrefetchError::FileInfo);
        }
    };

    let layout = match version {
        FormatVersion::Xp2003 => version17::timeline_layout(),
        FormatVersion::Vista7 => version23::timeline_layout(),
        FormatVersion::Win8x => version26::timeline_layout(),
        FormatVersion::Win10Early | FormatVersion::Win11 => {
            version30::timeline_layout(descriptors.file_metrics_offset)
        }
    };

    let (run_times, run_count) = read_timeline(data, &layout);
    Ok(FileInformation {
        descriptors,
        run_times,
        run_count,
    })
}

impl SectionDescriptors {
    /// Descriptors share the same relative offsets in every version
    fn parse_descriptors<'a>(
        data: &'a [u8],
        version: &FormatVersion,
    ) -> nom::IResult<&'a [u8], SectionDescriptors> {
        let (input, file_metrics_offset) = nom_unsigned_four_bytes(data, Endian::Le)?;
        let (input, file_metrics_count) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, trace_chains_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, trace_chains_count) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, filename_strings_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, filename_strings_size) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, volumes_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, volumes_count) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (mut input, volumes_size) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let mut directory_count = None;
        if !matches!(version, FormatVersion::Xp2003 | FormatVersion::Vista7) {
            let (remaining, count) = nom_unsigned_four_bytes(input, Endian::Le)?;
            directory_count = Some(count);
            input = remaining;
        }

        let descriptors = SectionDescriptors {
            file_metrics_offset,
            file_metrics_count,
            trace_chains_offset,
            trace_chains_count,
            filename_strings_offset,
            filename_strings_size,
            volumes_offset,
            volumes_count,
            volumes_size,
            directory_count,
        };
        Ok((input, descriptors))
    }
}

/// Read the run time slots and run count. Anything past the end of the buffer is treated as unpopulated
fn read_timeline(data: &[u8], layout: &TimelineLayout) -> (Vec<DateTime<Utc>>, u32) {
    let mut run_times = Vec::new();
    let start = (HEADER_SIZE + layout.run_times_offset) as u64;
    for slot in 0..layout.run_time_slots {
        let filetime = match nom_u64_at(data, start + (slot * 8) as u64) {
            Ok((_, result)) => result,
            Err(_err) => {
                warn!("[prefetch] Run time slot {slot} is past the end of the data");
                break;
            }
        };

        // Empty slots are skipped entirely
        if let Some(run_time) = filetime_to_datetime(filetime) {
            run_times.push(run_time);
        }
    }

    let run_count = match nom_u32_at(data, (HEADER_SIZE + layout.run_count_offset) as u64) {
        Ok((_, result)) => result,
        Err(_err) => {
            warn!("[prefetch] Run count is past the end of the data");
            0
        }
    };

    (run_times, run_count)
}
