use super::{
    filemetrics::FileMetric,
    header::Header,
    resolve::{resolve_path, DriveResolver},
    versions::version::SectionDescriptors,
    volume::VolumeInfo,
};
use crate::{filesystem::files::get_filename, utils::time::format_datetime};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefetchRecord {
    pub header: Header,
    /**Non-zero execution times, newest slot first as stored */
    pub last_run_times: Vec<DateTime<Utc>>,
    pub run_count: u32,
    /**Run count was replaced by the number of run times */
    pub run_count_repaired: bool,
    pub file_metrics: Vec<FileMetric>,
    pub filenames: Vec<String>,
    pub volumes: Vec<VolumeInfo>,
    pub descriptors: Option<SectionDescriptors>,
    pub parsing_error: bool,
    pub source_filename: Option<String>,
    pub source_created: Option<DateTime<Utc>>,
    pub source_modified: Option<DateTime<Utc>>,
    pub source_accessed: Option<DateTime<Utc>>,
}

/// One database row per prefetch file. Lists are stored as JSON text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefetchRow {
    pub filename: String,
    pub executable_name: String,
    pub hash: String,
    pub run_count: Option<u32>,
    pub last_executed: Option<String>,
    pub run_times: String,
    pub volumes: String,
    pub directories: String,
    pub resources: String,
    pub created_on: Option<String>,
    pub modified_on: Option<String>,
    pub accessed_on: Option<String>,
}

#[derive(Debug, Serialize)]
struct RowVolume<'a> {
    volume_id: String,
    device_name: &'a str,
    creation_time: Option<String>,
    serial_number: &'a str,
}

impl PrefetchRecord {
    pub(crate) fn new(header: Header) -> PrefetchRecord {
        PrefetchRecord {
            header,
            last_run_times: Vec::new(),
            run_count: 0,
            run_count_repaired: false,
            file_metrics: Vec::new(),
            filenames: Vec::new(),
            volumes: Vec::new(),
            descriptors: None,
            parsing_error: false,
            source_filename: None,
            source_created: None,
            source_modified: None,
            source_accessed: None,
        }
    }

    /// Most recent execution time
    pub fn last_executed(&self) -> Option<DateTime<Utc>> {
        self.last_run_times.iter().max().copied()
    }

    /// Flatten the record into its persistence shape. Volume paths are shown with drive letters when `resolver` knows them
    pub fn to_row(&self, resolver: &dyn DriveResolver) -> PrefetchRow {
        let filename = match &self.source_filename {
            Some(path) if !get_filename(path).is_empty() => get_filename(path),
            _ => String::from("Unknown"),
        };

        let run_count = if self.run_count_repaired && self.run_count == 0 {
            None
        } else {
            Some(self.run_count)
        };

        let mut run_times = self.last_run_times.clone();
        run_times.sort_by(|a, b| b.cmp(a));
        let run_times: Vec<String> = run_times.iter().map(format_datetime).collect();

        let volumes: Vec<RowVolume<'_>> = self
            .volumes
            .iter()
            .enumerate()
            .map(|(index, volume)| RowVolume {
                volume_id: match resolver.drive_letter(volume) {
                    Some(letter) => format!("{letter}:"),
                    None => format!("Volume{}", index + 1),
                },
                device_name: &volume.device_name,
                creation_time: volume.creation_time.as_ref().map(format_datetime),
                serial_number: &volume.serial_number,
            })
            .collect();

        let directories: Vec<String> = self
            .volumes
            .iter()
            .flat_map(|volume| volume.directory_names.iter())
            .map(|directory| resolve_path(directory, &self.volumes, resolver))
            .collect();
        let resources: Vec<String> = self
            .filenames
            .iter()
            .map(|filename| resolve_path(filename, &self.volumes, resolver))
            .collect();

        PrefetchRow {
            filename,
            executable_name: self.header.executable_name.clone(),
            hash: self.header.hash.clone(),
            run_count,
            last_executed: self.last_executed().as_ref().map(format_datetime),
            run_times: to_json(&run_times),
            volumes: to_json(&volumes),
            directories: to_json(&directories),
            resources: to_json(&resources),
            created_on: self.source_created.as_ref().map(format_datetime),
            modified_on: self.source_modified.as_ref().map(format_datetime),
            accessed_on: self.source_accessed.as_ref().map(format_datetime),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("[]"))
}
