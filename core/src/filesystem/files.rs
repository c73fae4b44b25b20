use super::{error::FileSystemError, metadata::get_metadata};
use log::{error, warn};
use std::{
    fs::{read, read_dir},
    path::Path,
};

/// Get a list of all files in a provided directory. Subdirectories are not followed
pub(crate) fn list_files(path: &str) -> Result<Vec<String>, FileSystemError> {
    if !is_directory(path) {
        return Err(FileSystemError::NotDirectory);
    }
    let dir_result = read_dir(path);
    let dir = match dir_result {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to get directory contents: {err:?}");
            return Err(FileSystemError::ReadDirectory);
        }
    };

    let mut files: Vec<String> = Vec::new();
    for entry_result in dir {
        let entry = match entry_result {
            Ok(result) => result,
            Err(err) => {
                error!("[core] Failed to get directory entry: {err:?}");
                continue;
            }
        };

        let full_path = entry.path().display().to_string();
        if !is_file(&full_path) {
            continue;
        }
        files.push(full_path);
    }

    files.sort();
    Ok(files)
}

/// Check if path is a file
pub(crate) fn is_file(path: &str) -> bool {
    Path::new(path).is_file()
}

/// Check if path is a directory
pub(crate) fn is_directory(path: &str) -> bool {
    Path::new(path).is_dir()
}

/// Read a file into memory. Files larger than 2GB are refused
pub(crate) fn read_file(path: &str) -> Result<Vec<u8>, FileSystemError> {
    if file_too_large(path) {
        return Err(FileSystemError::LargeFile);
    }
    if !is_file(path) {
        return Err(FileSystemError::NotFile);
    }

    let read_result = read(path);
    match read_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[core] Failed to read file {path}: {err:?}");
            Err(FileSystemError::ReadFile)
        }
    }
}

/// Return the extension of a file. Empty string if there is none
pub(crate) fn file_extension(path: &str) -> String {
    let file = Path::new(path);
    let extension = match file.extension() {
        Some(result) => result.to_str().unwrap_or(""),
        _ => "",
    };
    extension.to_string()
}

/// Size of file in bytes. Returns 0 on failure
pub(crate) fn get_file_size(path: &str) -> u64 {
    if !is_file(path) {
        return 0;
    }

    match get_metadata(path) {
        Ok(result) => result.len(),
        Err(err) => {
            error!("[core] Failed to get file size: {err:?}");
            0
        }
    }
}

fn file_too_large(path: &str) -> bool {
    let max_size = 2147483648; // 2GB
    get_file_size(path) >= max_size
}

/// Final component of either a Windows or Unix style path
pub(crate) fn get_filename(path: &str) -> String {
    if !path.contains(['/', '\\']) {
        return path.to_string();
    }

    match path.rsplit_once(['/', '\\']) {
        Some((_, name)) => name.to_string(),
        None => {
            warn!("[core] Failed to get filename from: {path}");
            path.to_string()
        }
    }
}
