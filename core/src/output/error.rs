use std::fmt;

#[derive(Debug, PartialEq)]
pub enum OutputError {
    CreateDirectory,
    CreateFile,
    WriteJson,
    Serialize,
    Sqlite,
    UnknownFormat,
}

impl std::error::Error for OutputError {}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::CreateDirectory => write!(f, "Could not create output directory"),
            OutputError::CreateFile => write!(f, "Could not create output file"),
            OutputError::WriteJson => write!(f, "Could not write output"),
            OutputError::Serialize => write!(f, "Could not serialize prefetch records"),
            OutputError::Sqlite => write!(f, "Could not write sqlite output"),
            OutputError::UnknownFormat => write!(f, "Unknown output format"),
        }
    }
}
