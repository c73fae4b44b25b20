use std::env::var;

/// Get an environment variable. Empty string if not set or not valid unicode
pub(crate) fn get_env_value(key: &str) -> String {
    var(key).unwrap_or_default()
}

/// Get the drive letter Windows is installed on. Defaults to `C`
pub(crate) fn get_systemdrive() -> char {
    get_env_value("SystemDrive")
        .chars()
        .next()
        .filter(char::is_ascii_alphabetic)
        .unwrap_or('C')
}
