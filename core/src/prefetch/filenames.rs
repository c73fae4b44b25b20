use super::versions::version::SectionDescriptors;
use crate::utils::{
    nom_helper::nom_data_at,
    strings::{extract_utf16_string, split_utf16_strings},
};
use log::warn;

/// Get the filename strings block. `None` if it does not fit in the data
pub(crate) fn filename_block<'a>(
    data: &'a [u8],
    descriptors: &SectionDescriptors,
) -> Option<&'a [u8]> {
    let block_result = nom_data_at(
        data,
        descriptors.filename_strings_offset as u64,
        descriptors.filename_strings_size as u64,
    );
    match block_result {
        Ok((_, block)) => Some(block),
        Err(err) => {
            warn!("[prefetch] Filename strings are out of bounds: {err:?}");
            None
        }
    }
}

/// Get all filenames referenced by the prefetch file, in the order they are stored
pub(crate) fn read_filenames(data: &[u8], descriptors: &SectionDescriptors) -> Vec<String> {
    match filename_block(data, descriptors) {
        Some(block) => split_utf16_strings(block),
        None => Vec::new(),
    }
}

/// Get the filename a file metric points to. `length` is in UTF16 characters
pub(crate) fn metric_filename(block: &[u8], offset: u32, length: u32) -> Option<String> {
    let size = length as u64 * 2;
    match nom_data_at(block, offset as u64, size) {
        Ok((_, name)) => Some(extract_utf16_string(name)),
        Err(_err) => None,
    }
}
