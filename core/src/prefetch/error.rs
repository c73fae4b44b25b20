use std::fmt;

#[derive(Debug, PartialEq)]
pub enum PrefetchError {
    InvalidSignature,
    UnknownVersion,
    DecompressionFailed,
    Header,
    FileInfo,
    ReadFile,
    ReadDirectory,
}

impl std::error::Error for PrefetchError {}

impl fmt::Display for PrefetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefetchError::InvalidSignature => write!(f, "Missing SCCA prefetch signature"),
            PrefetchError::UnknownVersion => write!(f, "Unknown prefetch version"),
            PrefetchError::DecompressionFailed => write!(f, "Failed to decompress prefetch data"),
            PrefetchError::Header => write!(f, "Failed to read prefetch header"),
            PrefetchError::FileInfo => write!(f, "Failed to parse file information section"),
            PrefetchError::ReadFile => write!(f, "Failed to read file"),
            PrefetchError::ReadDirectory => write!(f, "Failed to read directory"),
        }
    }
}
