use super::error::TomlError;
use crate::structs::toml::PrefetchToml;
use log::error;
use std::str::from_utf8;

impl PrefetchToml {
    /// Parse the prefetch TOML collector file
    pub(crate) fn parse_prefetch_toml(toml_data: &[u8]) -> Result<PrefetchToml, TomlError> {
        let text = match from_utf8(toml_data) {
            Ok(result) => result,
            Err(err) => {
                error!("[core] TOML data is not UTF8: {err:?}");
                return Err(TomlError::BadToml);
            }
        };

        let toml_results = toml::from_str(text);
        let mut collector: PrefetchToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[core] Failed to parse TOML data. Error: {err:?}");
                return Err(TomlError::BadToml);
            }
        };

        // Format is always lowercase
        collector.output.format = collector.output.format.to_lowercase();
        Ok(collector)
    }
}

#[cfg(test)]
mod tests {
    use crate::{filesystem::files::read_file, structs::toml::PrefetchToml};
    use std::path::PathBuf;

    #[test]
    fn test_parse_prefetch_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/prefetch.toml");

        let buffer = read_file(&test_location.display().to_string()).unwrap();

        let result = PrefetchToml::parse_prefetch_toml(&buffer).unwrap();
        assert_eq!(result.output.name, "prefetch_collection");
        assert_eq!(result.output.directory, "./tmp");
        assert_eq!(result.output.format, "jsonl");
        assert_eq!(result.output.logging.as_deref(), Some("warn"));
        assert_eq!(
            result.prefetch.alt_dir.as_deref(),
            Some("./tests/test_data/prefetch")
        );
        assert_eq!(result.prefetch.drives.get("D49D126F").unwrap(), "C");
    }

    #[test]
    fn test_parse_prefetch_toml_defaults() {
        let data = b"[output]\nname = \"test\"\ndirectory = \"./tmp\"\nformat = \"SQLite\"\n";
        let result = PrefetchToml::parse_prefetch_toml(data).unwrap();
        assert_eq!(result.output.format, "sqlite");
        assert!(result.output.logging.is_none());
        assert!(result.prefetch.alt_dir.is_none());
        assert!(result.prefetch.drives.is_empty());
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_prefetch_bad_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/malformed.toml");

        let buffer = read_file(&test_location.display().to_string()).unwrap();
        let _ = PrefetchToml::parse_prefetch_toml(&buffer).unwrap();
    }
}
