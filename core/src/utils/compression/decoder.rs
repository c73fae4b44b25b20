use super::{error::CompressionError, xpress::huffman::decompress_xpress_huffman};
use log::{error, warn};

/// Something that can expand Xpress Huffman data to exactly `size` bytes
pub trait XpressDecoder {
    fn decompress(&self, data: &[u8], size: u32) -> Result<Vec<u8>, CompressionError>;
}

/// Portable Xpress Huffman decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareHuffman;

/// Windows `RtlDecompressBufferEx`. Unavailable on other platforms
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHuffman;

/// Native decompression first, falling back to the software decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDecoder;

impl XpressDecoder for SoftwareHuffman {
    fn decompress(&self, data: &[u8], size: u32) -> Result<Vec<u8>, CompressionError> {
        let output = decompress_xpress_huffman(data, size as usize)?;
        check_size(output, size)
    }
}

impl XpressDecoder for NativeHuffman {
    #[cfg(target_os = "windows")]
    fn decompress(&self, data: &[u8], size: u32) -> Result<Vec<u8>, CompressionError> {
        use super::xpress::api::decompress_huffman_api;

        let output = decompress_huffman_api(data, size)?;
        check_size(output, size)
    }

    #[cfg(not(target_os = "windows"))]
    fn decompress(&self, _data: &[u8], _size: u32) -> Result<Vec<u8>, CompressionError> {
        Err(CompressionError::XpressUnavailable)
    }
}

impl XpressDecoder for DefaultDecoder {
    fn decompress(&self, data: &[u8], size: u32) -> Result<Vec<u8>, CompressionError> {
        match NativeHuffman.decompress(data, size) {
            Ok(result) => return Ok(result),
            Err(CompressionError::XpressUnavailable) => {}
            Err(err) => warn!("[compression] Native xpress huffman failed, trying software decoder: {err:?}"),
        }
        SoftwareHuffman.decompress(data, size)
    }
}

fn check_size(output: Vec<u8>, size: u32) -> Result<Vec<u8>, CompressionError> {
    if output.len() != size as usize {
        error!(
            "[compression] Decompressed {} bytes, expected {size}",
            output.len()
        );
        return Err(CompressionError::XpressSizeMismatch);
    }
    Ok(output)
}
