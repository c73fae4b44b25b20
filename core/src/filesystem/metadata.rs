use crate::utils::time::system_time_to_datetime;
use chrono::{DateTime, Utc};
use std::fs::{symlink_metadata, Metadata};
use std::io::Error;

/// Created, modified and accessed times of a file on disk. Any the platform cannot supply are `None`
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct StandardTimestamps {
    pub(crate) created: Option<DateTime<Utc>>,
    pub(crate) modified: Option<DateTime<Utc>>,
    pub(crate) accessed: Option<DateTime<Utc>>,
}

/// Get standard timestamps for the provided path
pub(crate) fn get_timestamps(path: &str) -> Result<StandardTimestamps, Error> {
    let meta = get_metadata(path)?;

    // Not every filesystem tracks creation time
    let timestamps = StandardTimestamps {
        created: meta.created().ok().and_then(system_time_to_datetime),
        modified: meta.modified().ok().and_then(system_time_to_datetime),
        accessed: meta.accessed().ok().and_then(system_time_to_datetime),
    };

    Ok(timestamps)
}

/// Get the metadata associated with provided path
pub(crate) fn get_metadata(path: &str) -> Result<Metadata, Error> {
    symlink_metadata(path)
}

#[cfg(test)]
mod tests {
    use super::{get_metadata, get_timestamps};
    use std::path::PathBuf;

    #[test]
    fn test_get_timestamps() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("Cargo.toml");

        let result = get_timestamps(&test_location.display().to_string()).unwrap();
        assert!(result.modified.is_some());
        assert!(result.accessed.is_some());
    }

    #[test]
    fn test_get_metadata() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("Cargo.toml");

        let result = get_metadata(&test_location.display().to_string()).unwrap();
        assert!(result.is_file());
    }

    #[test]
    fn test_get_timestamps_missing() {
        assert!(get_timestamps("/this/path/does/not/exist").is_err());
    }
}
