use super::volume::VolumeInfo;
use log::warn;
use std::collections::HashMap;

/// Maps a prefetch volume to the drive letter it had on the system. Only affects how paths are displayed
pub trait DriveResolver {
    fn drive_letter(&self, volume: &VolumeInfo) -> Option<char>;
}

/// Leaves every path as it was recorded
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDriveResolver;

impl DriveResolver for NoDriveResolver {
    fn drive_letter(&self, _volume: &VolumeInfo) -> Option<char> {
        None
    }
}

/// Drive letters looked up by volume serial number
#[derive(Debug, Default, Clone)]
pub struct SerialDriveMap {
    drives: HashMap<String, char>,
}

impl SerialDriveMap {
    /// Build from serial (hex) to drive letter pairs. Invalid letters are skipped
    pub fn new(drives: &HashMap<String, String>) -> SerialDriveMap {
        let mut map = HashMap::new();
        for (serial, letter) in drives {
            let drive = letter
                .trim_end_matches([':', '\\'])
                .chars()
                .next()
                .filter(char::is_ascii_alphabetic);
            let Some(drive) = drive else {
                warn!("[prefetch] Ignoring invalid drive letter {letter} for serial {serial}");
                continue;
            };

            let serial = serial.trim_start_matches("0x").to_uppercase();
            map.insert(format!("{serial:0>8}"), drive.to_ascii_uppercase());
        }
        SerialDriveMap { drives: map }
    }
}

impl DriveResolver for SerialDriveMap {
    fn drive_letter(&self, volume: &VolumeInfo) -> Option<char> {
        self.drives.get(&volume.serial_number).copied()
    }
}

/// Replace a leading volume device path with its drive letter. Unresolved paths are returned as is
pub(crate) fn resolve_path(
    path: &str,
    volumes: &[VolumeInfo],
    resolver: &dyn DriveResolver,
) -> String {
    for volume in volumes {
        let device = &volume.device_name;
        if device.is_empty() {
            continue;
        }
        let matches = path
            .get(..device.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(device));
        if !matches {
            continue;
        }

        if let Some(letter) = resolver.drive_letter(volume) {
            let rest = path[device.len()..].trim_start_matches('\\');
            return format!("{letter}:\\{rest}");
        }
    }
    path.to_string()
}
