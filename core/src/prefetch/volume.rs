use super::{filemetrics::MftReference, versions::version::SectionDescriptors};
use crate::utils::{
    nom_helper::{
        nom_data_at, nom_unsigned_eight_bytes, nom_unsigned_four_bytes, nom_unsigned_two_bytes,
        Endian,
    },
    strings::{decode_utf16_string, extract_utf16_string},
    time::filetime_to_datetime,
};
use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

const VOLUME_ENTRY_SIZE: u64 = 40;
const REFERENCES_HEADER_SIZE: u64 = 8;
const REFERENCE_SIZE: u64 = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeInfo {
    pub device_name: String,
    /**Serial as 8 uppercase hex digits */
    pub serial_number: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub file_references: Vec<MftReference>,
    pub directory_names: Vec<String>,
}

/// Pointers stored in a volume entry. Offsets are relative to the start of the volume section
struct VolumeEntry {
    device_offset: u32,
    device_chars: u32,
    creation: u64,
    serial: u32,
    references_offset: u32,
    references_size: u32,
    directories_offset: u32,
    directories_count: u32,
}

/// Parse all volume entries. A bad pointer inside an entry only empties that part of the volume
pub(crate) fn read_volumes(data: &[u8], descriptors: &SectionDescriptors) -> Vec<VolumeInfo> {
    let mut volumes = Vec::new();
    let section_offset = descriptors.volumes_offset as u64;

    for index in 0..descriptors.volumes_count as u64 {
        let entry_offset = section_offset + index * VOLUME_ENTRY_SIZE;
        let entry_result = nom_data_at(data, entry_offset, VOLUME_ENTRY_SIZE);
        let entry_data = match entry_result {
            Ok((_, result)) => result,
            Err(err) => {
                warn!("[prefetch] Volume entry {index} is out of bounds: {err:?}");
                break;
            }
        };

        let entry = match parse_entry(entry_data) {
            Ok((_, result)) => result,
            Err(err) => {
                warn!("[prefetch] Could not parse volume entry {index}: {err:?}");
                break;
            }
        };
        volumes.push(volume_info(data, section_offset, &entry));
    }

    volumes
}

fn parse_entry(data: &[u8]) -> nom::IResult<&[u8], VolumeEntry> {
    let (input, device_offset) = nom_unsigned_four_bytes(data, Endian::Le)?;
    let (input, device_chars) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, creation) = nom_unsigned_eight_bytes(input, Endian::Le)?;
    let (input, serial) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, references_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, references_size) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, directories_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
    let (input, directories_count) = nom_unsigned_four_bytes(input, Endian::Le)?;

    let entry = VolumeEntry {
        device_offset,
        device_chars,
        creation,
        serial,
        references_offset,
        references_size,
        directories_offset,
        directories_count,
    };
    Ok((input, entry))
}

fn volume_info(data: &[u8], section_offset: u64, entry: &VolumeEntry) -> VolumeInfo {
    let serial_number = format!("{:08X}", entry.serial);
    VolumeInfo {
        device_name: device_name(data, section_offset, entry, &serial_number),
        creation_time: filetime_to_datetime(entry.creation),
        file_references: file_references(data, section_offset, entry),
        directory_names: directory_names(data, section_offset, entry),
        serial_number,
    }
}

fn device_name(data: &[u8], section_offset: u64, entry: &VolumeEntry, serial: &str) -> String {
    let offset = section_offset + entry.device_offset as u64;
    let size = entry.device_chars as u64 * 2;
    let name_data = match nom_data_at(data, offset, size) {
        Ok((_, result)) => result,
        Err(err) => {
            warn!("[prefetch] Volume device name is out of bounds: {err:?}");
            return String::from("Unknown Device");
        }
    };

    match decode_utf16_string(name_data) {
        Some(name) => name,
        None => {
            warn!("[prefetch] Could not decode volume device name for serial {serial}");
            format!("Device-{serial}")
        }
    }
}

/// Parse up to the declared number of MFT references. Stops at whatever is actually available
fn file_references(data: &[u8], section_offset: u64, entry: &VolumeEntry) -> Vec<MftReference> {
    let mut references = Vec::new();
    if entry.references_offset == 0 || entry.references_size == 0 {
        return references;
    }

    let offset = section_offset + entry.references_offset as u64;
    let (input, header_data) = match nom_data_at(data, offset, REFERENCES_HEADER_SIZE) {
        Ok(result) => result,
        Err(err) => {
            warn!("[prefetch] Volume file references are out of bounds: {err:?}");
            return references;
        }
    };
    let (count_data, _format) = match nom_unsigned_four_bytes(header_data, Endian::Le) {
        Ok(result) => result,
        Err(_err) => return references,
    };
    let count = match nom_unsigned_four_bytes(count_data, Endian::Le) {
        Ok((_, result)) => result as u64,
        Err(_err) => return references,
    };

    let declared =
        (entry.references_size as u64).saturating_sub(REFERENCES_HEADER_SIZE) / REFERENCE_SIZE;
    let available = (input.len() as u64 / REFERENCE_SIZE).min(declared);
    if count > available {
        warn!(
            "[prefetch] Volume declares {count} file references but only {available} are available"
        );
    }

    let mut remaining = input;
    for _ in 0..count.min(available) {
        match nom_unsigned_eight_bytes(remaining, Endian::Le) {
            Ok((input, value)) => {
                references.push(MftReference::from_value(value));
                remaining = input;
            }
            Err(_err) => break,
        }
    }
    references
}

/// Parse the length prefixed directory strings. Stops at the first entry that does not fit
fn directory_names(data: &[u8], section_offset: u64, entry: &VolumeEntry) -> Vec<String> {
    let mut directories = Vec::new();
    if entry.directories_count == 0 {
        return directories;
    }

    let offset = section_offset + entry.directories_offset as u64;
    let mut input = match nom_data_at(data, offset, 0) {
        Ok((result, _)) => result,
        Err(err) => {
            warn!("[prefetch] Volume directory strings are out of bounds: {err:?}");
            return directories;
        }
    };

    for index in 0..entry.directories_count {
        let (remaining, chars) = match nom_unsigned_two_bytes(input, Endian::Le) {
            Ok(result) => result,
            Err(_err) => {
                warn!("[prefetch] Directory string {index} is out of bounds");
                break;
            }
        };

        // Character count does not include the end of string character
        let size = chars as u64 * 2 + 2;
        let (remaining, name_data) = match nom_data_at(remaining, 0, size) {
            Ok(result) => result,
            Err(_err) => {
                warn!(
                    "[prefetch] Directory string {index} needs {size} bytes, only {} remain",
                    remaining.len()
                );
                break;
            }
        };
        directories.push(extract_utf16_string(name_data));
        input = remaining;
    }

    directories
}
