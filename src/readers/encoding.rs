use encoding_rs::Encoding;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::PipelineConfig;

/// Text encoding lookup keyed by the logical year a file represents
#[derive(Debug, Clone)]
pub struct EncodingPolicy {
    by_year: BTreeMap<String, &'static Encoding>,
    default: &'static Encoding,
}

impl EncodingPolicy {
    pub fn new(default: &'static Encoding) -> Self {
        Self {
            by_year: BTreeMap::new(),
            default,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut policy = Self::new(resolve_label(&config.default_encoding)?);
        for (year, label) in &config.encodings {
            policy.by_year.insert(year.clone(), resolve_label(label)?);
        }
        Ok(policy)
    }

    /// Encoding for a year; unknown years get the default
    pub fn for_year(&self, year: &str) -> &'static Encoding {
        self.by_year.get(year).copied().unwrap_or(self.default)
    }

    /// Encoding for a source file, keyed by its stem (`2021.csv` -> `2021`)
    pub fn for_file(&self, path: &Path) -> &'static Encoding {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map_or(self.default, |year| self.for_year(year))
    }
}

/// Resolve a WHATWG encoding label such as `latin1` or `utf-8`
pub fn resolve_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ProcessingError::UnknownEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn test_resolve_labels() {
        assert_eq!(resolve_label("latin1").unwrap(), WINDOWS_1252);
        assert_eq!(resolve_label("ISO-8859-1").unwrap(), WINDOWS_1252);
        assert_eq!(resolve_label("utf-8").unwrap(), UTF_8);
        assert!(resolve_label("klingon").is_err());
    }

    #[test]
    fn test_policy_from_default_config() {
        let policy = EncodingPolicy::from_config(&PipelineConfig::default()).unwrap();

        assert_eq!(policy.for_file(Path::new("data/2021.csv")), WINDOWS_1252);
        assert_eq!(policy.for_file(Path::new("data/2022.csv")), UTF_8);
        assert_eq!(policy.for_file(Path::new("data/2023.csv")), WINDOWS_1252);
        assert_eq!(policy.for_file(Path::new("data/2024.csv")), UTF_8);
        assert_eq!(policy.for_file(Path::new("data/2019.csv")), UTF_8);
    }

    #[test]
    fn test_unknown_label_in_config() {
        let mut config = PipelineConfig::default();
        config
            .encodings
            .insert("2020".to_string(), "not-an-encoding".to_string());

        assert!(matches!(
            EncodingPolicy::from_config(&config),
            Err(ProcessingError::UnknownEncoding(_))
        ));
    }
}
