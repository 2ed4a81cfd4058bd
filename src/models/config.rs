use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
}

/// Source files sharing one field delimiter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceGroup {
    #[validate(length(equal = 1))]
    pub delimiter: String,

    #[validate(length(min = 1))]
    pub files: Vec<String>,
}

impl SourceGroup {
    pub fn new(delimiter: &str, files: &[&str]) -> Self {
        Self {
            delimiter: delimiter.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(ProcessingError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }
}

/// Names of the source columns the pipeline reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub date: String,
    pub time: String,
    pub state: String,
    pub km: String,
    pub accident_type: String,
    pub people: String,
    pub deaths: String,
    pub light_injuries: String,
    pub severe_injuries: String,
    pub uninjured: String,
    pub unknown: String,
    pub injured: String,
    pub vehicles: String,
    pub year: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: ID_COLUMN.to_string(),
            date: DATE_COLUMN.to_string(),
            time: TIME_COLUMN.to_string(),
            state: STATE_COLUMN.to_string(),
            km: KM_COLUMN.to_string(),
            accident_type: ACCIDENT_TYPE_COLUMN.to_string(),
            people: PEOPLE_COLUMN.to_string(),
            deaths: DEATHS_COLUMN.to_string(),
            light_injuries: LIGHT_INJURIES_COLUMN.to_string(),
            severe_injuries: SEVERE_INJURIES_COLUMN.to_string(),
            uninjured: UNINJURED_COLUMN.to_string(),
            unknown: UNKNOWN_COLUMN.to_string(),
            injured: INJURED_COLUMN.to_string(),
            vehicles: VEHICLES_COLUMN.to_string(),
            year: YEAR_COLUMN.to_string(),
        }
    }
}

impl ColumnNames {
    /// Victim and vehicle count columns, all of which must be non-negative
    pub fn count_columns(&self) -> [&str; 8] {
        [
            &self.people,
            &self.deaths,
            &self.light_injuries,
            &self.severe_injuries,
            &self.uninjured,
            &self.unknown,
            &self.injured,
            &self.vehicles,
        ]
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,

    #[validate(length(min = 1))]
    pub output_file: String,

    pub output_format: OutputFormat,

    pub compression: String,

    /// Delimiter groups, loaded and concatenated in this order
    #[validate(length(min = 1))]
    pub groups: Vec<SourceGroup>,

    /// Encoding label per logical year (file stem)
    pub encodings: BTreeMap<String, String>,

    #[validate(length(min = 1))]
    pub default_encoding: String,

    pub columns: ColumnNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut encodings = BTreeMap::new();
        for year in LEGACY_ENCODING_YEARS {
            encodings.insert(year.to_string(), LEGACY_ENCODING.to_string());
        }
        for year in MODERN_ENCODING_YEARS {
            encodings.insert(year.to_string(), MODERN_ENCODING.to_string());
        }

        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            output_format: OutputFormat::Csv,
            compression: COMPRESSION_SNAPPY.to_string(),
            groups: vec![
                SourceGroup::new(";", &SEMICOLON_GROUP_FILES),
                SourceGroup::new(",", &COMMA_GROUP_FILES),
            ],
            encodings,
            default_encoding: MODERN_ENCODING.to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Layer an optional config file and `ACIDENTES_*` environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field-level validation plus the per-group checks
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        for group in &self.groups {
            group.validate()?;
            group.delimiter_byte()?;
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_output_file(mut self, output_file: String) -> Self {
        self.output_file = output_file;
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_compression(mut self, compression: String) -> Self {
        self.compression = compression;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_file)
    }

    pub fn source_files(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.files.iter().map(String::as_str))
    }

    /// Declared source files absent from the data directory, in listed order
    pub fn missing_files(&self) -> Vec<String> {
        self.source_files()
            .filter(|file| !self.data_dir.join(file).is_file())
            .map(str::to_string)
            .collect()
    }

    /// Delimiter group a declared file belongs to
    pub fn group_of(&self, file: &str) -> Option<&SourceGroup> {
        self.groups
            .iter()
            .find(|g| g.files.iter().any(|f| f == file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let config = PipelineConfig::default();

        assert!(config.check().is_ok());
        assert_eq!(
            config.source_files().collect::<Vec<_>>(),
            vec!["2021.csv", "2022.csv", "2023.csv", "2024.csv"]
        );
        assert_eq!(config.group_of("2022.csv").unwrap().delimiter, ";");
        assert_eq!(config.group_of("2024.csv").unwrap().delimiter, ",");
        assert!(config.group_of("2030.csv").is_none());
        assert_eq!(config.encodings.get("2021").unwrap(), "latin1");
        assert_eq!(config.encodings.get("2024").unwrap(), "utf-8");
    }

    #[test]
    fn test_invalid_delimiter_rejected() {
        let mut config = PipelineConfig::default();
        config.groups[0].delimiter = ";;".to_string();
        assert!(config.check().is_err());

        let mut config = PipelineConfig::default();
        config.groups[1].files.clear();
        assert!(config.check().is_err());

        let config = PipelineConfig::default().with_output_file(String::new());
        assert!(config.check().is_err());
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2021.csv"), "id\n1\n").unwrap();
        fs::write(dir.path().join("2024.csv"), "id\n1\n").unwrap();

        let config = PipelineConfig::default().with_data_dir(dir.path().to_path_buf());
        assert_eq!(config.missing_files(), vec!["2022.csv", "2023.csv"]);
        assert_eq!(
            config.output_path(),
            dir.path().join("acidentes_consolidados.csv")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(
            &path,
            r#"
data_dir = "/srv/acidentes"
output_format = "parquet"
default_encoding = "latin1"

[columns]
date = "data"

[[groups]]
delimiter = "|"
files = ["2025.csv"]
"#,
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/acidentes"));
        assert_eq!(config.output_format, OutputFormat::Parquet);
        assert_eq!(config.default_encoding, "latin1");
        assert_eq!(config.columns.date, "data");
        assert_eq!(config.columns.state, "uf");
        assert_eq!(config.groups, vec![SourceGroup::new("|", &["2025.csv"])]);
        assert_eq!(config.output_file, "acidentes_consolidados.csv");
    }
}
