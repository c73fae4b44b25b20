use log::warn;

/// Convert little endian bytes to UTF16 code units. A trailing odd byte is ignored
fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|wide_char| u16::from_le_bytes([wide_char[0], wide_char[1]]))
        .collect()
}

/// Keep code units up to the first null
fn until_null(units: &[u16]) -> &[u16] {
    match units.iter().position(|unit| *unit == 0) {
        Some(end) => &units[..end],
        None => units,
    }
}

/// Get a UTF16 string from provided bytes data. Stops at the first null. Invalid UTF16 is replaced
pub(crate) fn extract_utf16_string(data: &[u8]) -> String {
    let units = utf16_units(data);
    let value = until_null(&units);
    match String::from_utf16(value) {
        Ok(result) => result,
        Err(err) => {
            warn!("[strings] Failed to get UTF16 string: {err:?}");
            String::from_utf16_lossy(value)
        }
    }
}

/// Get a UTF16 string from provided bytes data. Stops at the first null. Returns `None` if the string is not valid UTF16
pub(crate) fn decode_utf16_string(data: &[u8]) -> Option<String> {
    let units = utf16_units(data);
    String::from_utf16(until_null(&units)).ok()
}

/// Split a block of null separated UTF16 strings. Empty strings are dropped
pub(crate) fn split_utf16_strings(data: &[u8]) -> Vec<String> {
    let units = utf16_units(data);
    let mut strings = Vec::new();
    for value in units.split(|unit| *unit == 0) {
        if value.is_empty() {
            continue;
        }
        let entry = match String::from_utf16(value) {
            Ok(result) => result,
            Err(err) => {
                warn!("[strings] Failed to get UTF16 string from block: {err:?}");
                String::from_utf16_lossy(value)
            }
        };
        strings.push(entry);
    }
    strings
}
