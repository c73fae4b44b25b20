use super::{
    error::PrefetchError,
    filemetrics::read_file_metrics,
    filenames::read_filenames,
    header::{CompressedHeader, Header},
    record::PrefetchRecord,
    versions::version::read_file_info_section,
    volume::read_volumes,
};
use crate::{
    filesystem::metadata::get_timestamps,
    utils::compression::decoder::{DefaultDecoder, XpressDecoder},
};
use log::{error, warn};
use std::borrow::Cow;

const XPRESS_HUFFMAN_FORMAT: u8 = 4;
const MAX_RUN_COUNT: u32 = 1_000_000;
/// Real prefetch files are a few hundred KB at most
const MAX_DECOMPRESSED_SIZE: u32 = 64 * 1024 * 1024;

/// Parse prefetch bytes, decompressing Windows 10+ files with the platform decoder
pub fn parse_prefetch(data: &[u8], path: Option<&str>) -> Result<PrefetchRecord, PrefetchError> {
    build_prefetch(data, path, &DefaultDecoder)
}

/**
 * Parse prefetch bytes into a `PrefetchRecord` using the provided Xpress decoder.
 * A bad signature, unknown version or failed decompression is an error.
 * A damaged file information section still returns the header with `parsing_error` set
 */
pub fn build_prefetch(
    data: &[u8],
    path: Option<&str>,
    decoder: &dyn XpressDecoder,
) -> Result<PrefetchRecord, PrefetchError> {
    let prefetch_data = decompress_prefetch(data, decoder)?;
    let header = Header::parse_header(&prefetch_data)?;
    let version = header.version;
    let mut record = PrefetchRecord::new(header);

    match read_file_info_section(&prefetch_data, &version) {
        Ok(info) => {
            record.file_metrics = read_file_metrics(&prefetch_data, &info.descriptors, &version);
            record.filenames = read_filenames(&prefetch_data, &info.descriptors);
            record.volumes = read_volumes(&prefetch_data, &info.descriptors);
            record.last_run_times = info.run_times;
            record.run_count = info.run_count;
            record.descriptors = Some(info.descriptors);
        }
        Err(err) => {
            warn!(
                "[prefetch] Only the header of {} could be parsed: {err:?}",
                path.unwrap_or(record.header.executable_name.as_str())
            );
            record.parsing_error = true;
        }
    }

    repair_run_count(&mut record);

    if let Some(source) = path {
        record.source_filename = Some(source.to_string());
        if let Ok(timestamps) = get_timestamps(source) {
            record.source_created = timestamps.created;
            record.source_modified = timestamps.modified;
            record.source_accessed = timestamps.accessed;
        }
    }

    Ok(record)
}

/// Expand MAM compressed data. Uncompressed data is returned as is
pub(crate) fn decompress_prefetch<'a>(
    data: &'a [u8],
    decoder: &dyn XpressDecoder,
) -> Result<Cow<'a, [u8]>, PrefetchError> {
    if !CompressedHeader::is_compressed(data) {
        return Ok(Cow::Borrowed(data));
    }

    let (payload, header) = match CompressedHeader::parse_compressed_header(data) {
        Ok(result) => result,
        Err(err) => {
            error!("[prefetch] Compressed prefetch header too small: {err:?}");
            return Err(PrefetchError::DecompressionFailed);
        }
    };
    if header.uncompressed_size > MAX_DECOMPRESSED_SIZE {
        error!(
            "[prefetch] Compressed prefetch declares {} bytes, limit is {MAX_DECOMPRESSED_SIZE}",
            header.uncompressed_size
        );
        return Err(PrefetchError::DecompressionFailed);
    }
    if header.format != XPRESS_HUFFMAN_FORMAT {
        warn!(
            "[prefetch] Unexpected compression format {}, trying xpress huffman",
            header.format
        );
    }

    match decoder.decompress(payload, header.uncompressed_size) {
        Ok(result) if result.len() == header.uncompressed_size as usize => Ok(Cow::Owned(result)),
        Ok(result) => {
            error!(
                "[prefetch] Decompressed {} bytes, header declared {}",
                result.len(),
                header.uncompressed_size
            );
            Err(PrefetchError::DecompressionFailed)
        }
        Err(err) => {
            error!("[prefetch] Could not decompress prefetch data: {err:?}");
            Err(PrefetchError::DecompressionFailed)
        }
    }
}

/// Counts above a million or a zero count with run times present are not trusted
fn repair_run_count(record: &mut PrefetchRecord) {
    let suspicious = record.run_count > MAX_RUN_COUNT
        || (record.run_count == 0 && !record.last_run_times.is_empty());
    if !suspicious {
        return;
    }

    warn!(
        "[prefetch] Replacing run count {} of {} with the number of run times",
        record.run_count, record.header.executable_name
    );
    record.run_count = record.last_run_times.len() as u32;
    record.run_count_repaired = true;
}

#[cfg(test)]
mod tests {
    use super::{build_prefetch, decompress_prefetch, parse_prefetch};
    use crate::{
        prefetch::{
            error::PrefetchError,
            header::FormatVersion,
            testing::{header_bytes, mam_compress, test_volume, PrefetchBuilder},
        },
        utils::compression::{
            decoder::{NativeHuffman, SoftwareHuffman, XpressDecoder},
            error::CompressionError,
        },
    };
    use std::path::PathBuf;

    struct BrokenDecoder;

    impl XpressDecoder for BrokenDecoder {
        fn decompress(&self, _data: &[u8], _size: u32) -> Result<Vec<u8>, CompressionError> {
            Err(CompressionError::XpressBadPrefix)
        }
    }

    struct ShortDecoder;

    impl XpressDecoder for ShortDecoder {
        fn decompress(&self, _data: &[u8], size: u32) -> Result<Vec<u8>, CompressionError> {
            Ok(vec![0; size as usize / 2])
        }
    }

    fn sample(version: u32) -> PrefetchBuilder {
        PrefetchBuilder::new(version)
            .run_times(&[132244766418940254, 0, 132210000000000000])
            .run_count(4)
            .metric(
                "\\VOLUME{01d4e1c6a4b29d52-d49d126f}\\WINDOWS\\SYSTEM32\\NTDLL.DLL",
                0x0001_0000_0000_0010,
            )
            .metric(
                "\\VOLUME{01d4e1c6a4b29d52-d49d126f}\\WINDOWS\\NOTEPAD.EXE",
                0x0002_0000_0000_a3c1,
            )
            .volume(test_volume("\\VOLUME{01d4e1c6a4b29d52-d49d126f}", 0xD49D126F))
    }

    #[test]
    fn test_parse_prefetch_vista() {
        let data = sample(23).build();
        let result = parse_prefetch(&data, None).unwrap();

        assert_eq!(result.header.version, FormatVersion::Vista7);
        assert_eq!(result.header.signature, "SCCA");
        assert_eq!(result.header.executable_name, "NOTEPAD.EXE");
        assert_eq!(result.header.hash, "AF43252D");
        assert_eq!(result.header.file_size as usize, data.len());
        assert_eq!(result.last_run_times.len(), 2);
        assert_eq!(result.run_count, 4);
        assert!(!result.run_count_repaired);
        assert_eq!(result.file_metrics.len(), 2);
        assert_eq!(result.filenames.len(), 2);
        assert_eq!(result.volumes.len(), 1);
        assert_eq!(result.volumes[0].serial_number, "D49D126F");
        assert!(!result.parsing_error);
        assert!(result.descriptors.is_some());
        assert!(result.source_filename.is_none());
    }

    #[test]
    fn test_parse_prefetch_all_versions() {
        for version in [17, 23, 26, 30, 31] {
            let data = sample(version).build();
            let result = parse_prefetch(&data, None).unwrap();
            assert_eq!(result.header.version.value(), version);
            assert_eq!(result.file_metrics.len(), 2);
            assert_eq!(result.volumes.len(), 1);
            assert!(!result.parsing_error);

            let expected_times = if version == 17 { 1 } else { 2 };
            assert_eq!(result.last_run_times.len(), expected_times);
        }
    }

    #[test]
    fn test_parse_prefetch_minimal_section() {
        for version in [17, 23, 26, 30, 31] {
            let format = FormatVersion::from_value(version).unwrap();
            let mut data = header_bytes(version, "CMD.EXE", 0x1234, 0);
            data.resize(84 + format.section_size(), 0);

            let result = parse_prefetch(&data, None).unwrap();
            assert!(!result.parsing_error);
            assert!(result.file_metrics.is_empty());
            assert!(result.volumes.is_empty());
            assert_eq!(result.header.hash, "00001234");
        }
    }

    #[test]
    fn test_parse_prefetch_huge_run_count() {
        let data = sample(26).run_count(5_000_000).build();
        let result = parse_prefetch(&data, None).unwrap();

        assert_eq!(result.run_count, 2);
        assert!(result.run_count_repaired);
    }

    #[test]
    fn test_parse_prefetch_zero_run_count() {
        let data = sample(30).run_count(0).build();
        let result = parse_prefetch(&data, None).unwrap();
        assert_eq!(result.run_count, 2);

        // Zero with no run times is left alone
        let data = PrefetchBuilder::new(30).build();
        let result = parse_prefetch(&data, None).unwrap();
        assert_eq!(result.run_count, 0);
        assert!(!result.run_count_repaired);
    }

    #[test]
    #[should_panic(expected = "InvalidSignature")]
    fn test_parse_prefetch_bad_signature() {
        let mut data = sample(23).build();
        data[4..8].copy_from_slice(b"SCCB");
        parse_prefetch(&data, None).unwrap();
    }

    #[test]
    #[should_panic(expected = "UnknownVersion")]
    fn test_parse_prefetch_unknown_version() {
        let mut data = sample(23).build();
        data[0] = 24;
        parse_prefetch(&data, None).unwrap();
    }

    #[test]
    #[should_panic(expected = "InvalidSignature")]
    fn test_parse_prefetch_empty() {
        parse_prefetch(&[], None).unwrap();
    }

    #[test]
    fn test_parse_prefetch_deterministic() {
        let data = mam_compress(&sample(30).build());
        let first = parse_prefetch(&data, None).unwrap();
        let second = parse_prefetch(&data, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_prefetch_compressed() {
        let plain = sample(31).build();
        let data = mam_compress(&plain);

        let compressed = build_prefetch(&data, None, &SoftwareHuffman).unwrap();
        let uncompressed = build_prefetch(&plain, None, &SoftwareHuffman).unwrap();
        assert_eq!(compressed, uncompressed);
        assert_eq!(compressed.header.version, FormatVersion::Win11);
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    #[should_panic(expected = "DecompressionFailed")]
    fn test_build_prefetch_no_native_decoder() {
        let mut data = b"MAM\x04".to_vec();
        data.extend_from_slice(&1024u32.to_le_bytes());
        data.extend_from_slice(&[0; 300]);
        build_prefetch(&data, None, &NativeHuffman).unwrap();
    }

    #[test]
    #[should_panic(expected = "DecompressionFailed")]
    fn test_build_prefetch_decoder_error() {
        let data = mam_compress(&sample(30).build());
        build_prefetch(&data, None, &BrokenDecoder).unwrap();
    }

    #[test]
    #[should_panic(expected = "DecompressionFailed")]
    fn test_build_prefetch_short_output() {
        let data = mam_compress(&sample(30).build());
        build_prefetch(&data, None, &ShortDecoder).unwrap();
    }

    #[test]
    #[should_panic(expected = "DecompressionFailed")]
    fn test_decompress_prefetch_short_header() {
        decompress_prefetch(b"MAM\x04\x10", &SoftwareHuffman).unwrap();
    }

    #[test]
    #[should_panic(expected = "DecompressionFailed")]
    fn test_decompress_prefetch_declared_size_too_large() {
        // One long match would expand these few bytes to the declared size
        let mut payload = vec![0u8; 256];
        payload[32] = 0x10;
        payload[135] = 0x10;
        payload.extend_from_slice(&[0x00, 0x40, 0x00, 0x00, 0xff, 0x00, 0x00]);
        payload.extend_from_slice(&u32::MAX.to_le_bytes());

        let mut data = b"MAM\x04".to_vec();
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        data.extend(payload);
        decompress_prefetch(&data, &SoftwareHuffman).unwrap();
    }

    #[test]
    fn test_decompress_prefetch_size_limit() {
        let plain = sample(30).build();
        let mut data = mam_compress(&plain);
        data[4..8].copy_from_slice(&(64 * 1024 * 1024u32 + 1).to_le_bytes());
        assert_eq!(
            decompress_prefetch(&data, &SoftwareHuffman).unwrap_err(),
            PrefetchError::DecompressionFailed
        );
    }

    #[test]
    fn test_parse_prefetch_other_compression_format() {
        let plain = sample(30).build();
        let mut data = mam_compress(&plain);
        data[3] = 3;

        let result = build_prefetch(&data, None, &SoftwareHuffman).unwrap();
        let expected = build_prefetch(&plain, None, &SoftwareHuffman).unwrap();
        assert_eq!(result, expected);
        assert_eq!(result.header.version, FormatVersion::Win10Early);
    }

    #[test]
    fn test_decompress_prefetch_uncompressed() {
        let data = sample(23).build();
        let result = decompress_prefetch(&data, &BrokenDecoder).unwrap();
        assert_eq!(result.as_ref(), data.as_slice());
    }

    #[test]
    fn test_parse_prefetch_truncated_section() {
        let data = sample(26).build();
        let result = parse_prefetch(&data[..120], None).unwrap();

        assert!(result.parsing_error);
        assert_eq!(result.header.executable_name, "NOTEPAD.EXE");
        assert!(result.descriptors.is_none());
        assert!(result.file_metrics.is_empty());
        assert!(result.last_run_times.is_empty());
    }

    #[test]
    fn test_parse_prefetch_source_metadata() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/prefetch/CALC.EXE-3FBEF7FD.pf");
        let path = test_location.display().to_string();
        let data = std::fs::read(&path).unwrap();

        let result = parse_prefetch(&data, Some(&path)).unwrap();
        assert_eq!(result.source_filename.as_deref(), Some(path.as_str()));
        assert!(result.source_modified.is_some());
        assert_eq!(result.header.executable_name, "CALC.EXE");
        assert_eq!(result.header.hash, "3FBEF7FD");
    }

    #[test]
    fn test_parse_prefetch_missing_source() {
        let data = sample(23).build();
        let path = "/does/not/exist/NOTEPAD.EXE-AF43252D.pf";
        let result = parse_prefetch(&data, Some(path)).unwrap();
        assert!(result.source_created.is_none());
        assert!(result.source_modified.is_none());
        assert_eq!(result.source_filename.as_deref(), Some(path));
    }
}
