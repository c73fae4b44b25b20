use std::fmt;

#[derive(Debug, PartialEq)]
pub enum CompressionError {
    XpressNoMoreData,
    XpressBadOffset,
    XpressBadPrefix,
    XpressBadLength,
    XpressSizeMismatch,
    XpressUnavailable,
    #[cfg(target_os = "windows")]
    HuffmanCompression,
}

impl std::error::Error for CompressionError {}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::XpressNoMoreData => write!(f, "No more xpress huffman data"),
            CompressionError::XpressBadOffset => write!(f, "Bad xpress offset"),
            CompressionError::XpressBadPrefix => write!(f, "Bad xpress prefix"),
            CompressionError::XpressBadLength => write!(f, "Bad xpress match length"),
            CompressionError::XpressSizeMismatch => {
                write!(f, "Decompressed size does not match expected size")
            }
            CompressionError::XpressUnavailable => {
                write!(f, "Xpress huffman decompression not available")
            }
            #[cfg(target_os = "windows")]
            CompressionError::HuffmanCompression => {
                write!(f, "Failed to decompress huffman compressed data")
            }
        }
    }
}
