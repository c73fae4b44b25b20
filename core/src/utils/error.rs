use std::fmt;

#[derive(Debug)]
pub enum TomlError {
    NoFile,
    BadToml,
    CreateDirectory,
    LogFile,
    Collection,
    Output,
}

impl std::error::Error for TomlError {}

impl fmt::Display for TomlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlError::NoFile => write!(f, "Could not read TOML file"),
            TomlError::BadToml => write!(f, "Failed to parse TOML data"),
            TomlError::CreateDirectory => write!(f, "Could not create directory(ies)"),
            TomlError::LogFile => write!(f, "Could not create log file"),
            TomlError::Collection => write!(f, "Failed to collect prefetch files"),
            TomlError::Output => write!(f, "Failed to output prefetch data"),
        }
    }
}
