use polars::prelude::{CsvWriter as FrameCsvWriter, DataFrame, SerWriter};
use std::fs::{self, File};
use std::path::Path;

use crate::error::Result;
use crate::utils::constants::OUTPUT_DATE_FORMAT;

/// Writes a frame as UTF-8 comma separated text with a header row; nulls
/// are written as empty cells and dates as `YYYY-MM-DD`
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Overwrites `path` if it exists
    pub fn write_frame(&self, frame: &DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        let mut frame = frame.clone();
        FrameCsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_date_format(Some(OUTPUT_DATE_FORMAT.to_string()))
            .finish(&mut frame)?;

        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::df;
    use polars::prelude::{DateChunked, IntoColumn, IntoSeries, NamedFrom, Series};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_frame() -> Result<()> {
        let dates = DateChunked::from_naive_date_options(
            "data_inversa".into(),
            [NaiveDate::from_ymd_opt(2021, 3, 9), None],
        );
        let frame = DataFrame::new(vec![
            Series::new("id".into(), &[1i64, 2]).into_column(),
            dates.into_series().into_column(),
            Series::new("km".into(), &[12.5f64, 3.25]).into_column(),
            Series::new("municipio".into(), &[Some("São Paulo, SP"), None]).into_column(),
        ])?;

        let dir = TempDir::new()?;
        let path = dir.path().join("out").join("consolidado.csv");
        CsvWriter::new().write_frame(&frame, &path)?;

        let written = fs::read_to_string(&path)?;
        assert_eq!(
            written,
            "id,data_inversa,km,municipio\n1,2021-03-09,12.5,\"São Paulo, SP\"\n2,,3.25,\n"
        );

        Ok(())
    }

    #[test]
    fn test_overwrites_existing_output() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("consolidado.csv");
        fs::write(&path, "old contents that are longer than the new ones\n")?;

        let frame = df!("id" => [7i64])?;
        CsvWriter::new().write_frame(&frame, &path)?;

        assert_eq!(fs::read_to_string(&path)?, "id\n7\n");
        Ok(())
    }
}
