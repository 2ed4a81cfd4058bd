use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{concat_frames, date_view, PipelineConfig};
use crate::readers::{EncodingPolicy, SourceReader};
use crate::utils::constants::DATE_FORMATS;

/// Outcome of loading one declared source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLoad {
    pub file: String,
    pub delimiter: String,
    pub encoding: String,
    pub rows: usize,
    pub skipped_lines: usize,
    pub failed: bool,
}

/// Merges every declared source file into one table: files within a group
/// in listed order, groups in listed order.
pub struct Consolidator<'a> {
    config: &'a PipelineConfig,
    reader: SourceReader,
}

impl<'a> Consolidator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            reader: SourceReader::new(),
        }
    }

    pub fn consolidate(&self) -> Result<(DataFrame, Vec<FileLoad>)> {
        let data_dir = &self.config.data_dir;
        if !data_dir.is_dir() {
            return Err(ProcessingError::DataDirNotFound(data_dir.clone()));
        }

        let missing = self.config.missing_files();
        if !missing.is_empty() {
            return Err(ProcessingError::MissingSourceFiles {
                dir: data_dir.clone(),
                files: missing,
            });
        }

        let policy = EncodingPolicy::from_config(self.config)?;
        let mut loads = Vec::new();
        let mut group_frames = Vec::with_capacity(self.config.groups.len());

        for group in &self.config.groups {
            let delimiter = group.delimiter_byte()?;
            let mut frames = Vec::with_capacity(group.files.len());

            for file in &group.files {
                let path = data_dir.join(file);
                let encoding = policy.for_file(&path);
                let mut load = FileLoad {
                    file: file.clone(),
                    delimiter: group.delimiter.clone(),
                    encoding: encoding.name().to_string(),
                    rows: 0,
                    skipped_lines: 0,
                    failed: false,
                };

                match self.reader.read(&path, delimiter, encoding) {
                    Ok((frame, report)) => {
                        info!(
                            file = %file,
                            encoding = encoding.name(),
                            rows = report.rows,
                            skipped = report.skipped_lines,
                            "Loaded source file"
                        );
                        load.rows = report.rows;
                        load.skipped_lines = report.skipped_lines;
                        frames.push(frame);
                    }
                    Err(e) => {
                        // Unreadable file contributes no rows
                        warn!(file = %file, error = %e, "Failed to load source file");
                        load.failed = true;
                    }
                }
                loads.push(load);
            }

            group_frames.push(concat_frames(frames)?);
        }

        let mut unified = concat_frames(group_frames)?;
        if unified.height() == 0 {
            return Err(ProcessingError::EmptyConsolidation);
        }

        parse_date_column(
            &mut unified,
            &self.config.columns.date,
            &self.config.columns.year,
        )?;

        info!(
            rows = unified.height(),
            columns = unified.width(),
            "Consolidated source files"
        );

        Ok((unified, loads))
    }
}

/// Parse a date written in any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day_part = trimmed
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or(trimmed);

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day_part, format).ok())
}

/// Convert the date column to dates (unparseable cells become null) and
/// write the year of every parsed date to the year column. Rows whose date
/// did not parse keep the year the source gave them, or null. No-op when
/// the date column is absent.
pub fn parse_date_column(
    frame: &mut DataFrame,
    date_column: &str,
    year_column: &str,
) -> Result<()> {
    let Ok(column) = frame.column(date_column) else {
        warn!(column = date_column, "Date column not present; skipping date parsing");
        return Ok(());
    };

    let dates = date_view(column)?;
    let unparsed = dates.null_count();
    if unparsed > 0 {
        warn!(column = date_column, count = unparsed, "Unparseable or empty dates set to null");
    }

    let source_years: Vec<Option<i64>> = match frame.column(year_column) {
        Ok(existing) => existing
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .collect(),
        Err(_) => vec![None; frame.height()],
    };

    let years: Int64Chunked = dates
        .date()?
        .as_date_iter()
        .zip(source_years)
        .map(|(date, source)| date.map(|d| d.year() as i64).or(source))
        .collect();

    frame.with_column(dates)?;
    frame.with_column(years.with_name(year_column.into()).into_series())?;
    Ok(())
}
