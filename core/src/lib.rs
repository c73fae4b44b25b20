//! Windows Prefetch parser
//!
//! Parses XP through Windows 11 prefetch files, including MAM compressed files,
//! into `PrefetchRecord`s. Directories of prefetch files can be collected through a TOML
//! config and written to json, jsonl or sqlite

pub mod core;
mod filesystem;
mod output;
pub mod prefetch;
pub mod structs;
mod utils;

pub use crate::core::{parse_toml_data, parse_toml_file, prefetch_collection};
pub use output::error::OutputError;
pub use prefetch::{
    error::PrefetchError,
    filemetrics::{FileMetric, MftReference, TraceChain},
    header::{FormatVersion, Header},
    parser::{custom_prefetch_path, grab_prefetch, parse_prefetch_file, PrefetchCollection},
    pf::{build_prefetch, parse_prefetch},
    record::{PrefetchRecord, PrefetchRow},
    resolve::{DriveResolver, NoDriveResolver, SerialDriveMap},
    versions::version::SectionDescriptors,
    volume::VolumeInfo,
};
pub use utils::{
    compression::{
        decoder::{DefaultDecoder, NativeHuffman, SoftwareHuffman, XpressDecoder},
        error::CompressionError,
    },
    error::TomlError,
};
