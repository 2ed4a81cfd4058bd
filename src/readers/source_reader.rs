use csv::{ReaderBuilder, Trim, WriterBuilder};
use encoding_rs::Encoding;
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::NULL_TOKENS;
use crate::utils::numbers::is_null_token;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub skipped_lines: usize,
    pub decode_errors: bool,
}

/// Reads one delimited source file into a typed frame. Lines with more
/// fields than the header and lines with no values at all are skipped;
/// short lines are padded with nulls.
pub struct SourceReader {
    max_rows: Option<usize>,
}

impl SourceReader {
    pub fn new() -> Self {
        Self { max_rows: None }
    }

    /// Stop after `max_rows` data rows
    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows: Some(max_rows),
        }
    }

    pub fn read(
        &self,
        path: &Path,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<(DataFrame, LoadReport)> {
        let bytes = fs::read(path)?;

        // BOM sniffing overrides `encoding` when a BOM is present
        let (text, used, decode_errors) = encoding.decode(&bytes);
        if decode_errors {
            warn!(
                file = %path.display(),
                encoding = used.name(),
                "Replaced undecodable bytes while reading"
            );
        }

        let (frame, mut report) = self.read_str(&text, delimiter, &path.display().to_string())?;
        report.decode_errors = decode_errors;
        Ok((frame, report))
    }

    /// Parse already-decoded text
    pub fn read_str(
        &self,
        text: &str,
        delimiter: u8,
        source: &str,
    ) -> Result<(DataFrame, LoadReport)> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = unique_headers(reader.headers()?.iter());
        if headers.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "{} has no header row",
                source
            )));
        }

        // Well-formed rows are re-emitted as plain comma separated text for
        // the polars reader, which then infers the column types
        let mut clean = WriterBuilder::new().from_writer(Vec::new());
        clean.write_record(&headers)?;
        let mut report = LoadReport::default();

        for result in reader.records() {
            if self.max_rows.is_some_and(|max| report.rows >= max) {
                break;
            }

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(source, error = %e, "Skipping unparseable line");
                    report.skipped_lines += 1;
                    continue;
                }
            };

            let line = record.position().map_or(0, |p| p.line());
            if record.len() > headers.len() {
                warn!(
                    source,
                    line,
                    expected = headers.len(),
                    found = record.len(),
                    "Skipping malformed line"
                );
                report.skipped_lines += 1;
                continue;
            }

            if record.iter().all(is_null_token) {
                debug!(source, line, "Skipping line without values");
                report.skipped_lines += 1;
                continue;
            }

            clean.write_record((0..headers.len()).map(|idx| record.get(idx).unwrap_or("")))?;
            report.rows += 1;
        }

        let bytes = clean.into_inner().map_err(|e| e.into_error())?;
        let frame = parse_clean_csv(bytes)?;

        debug!(
            source,
            rows = report.rows,
            columns = frame.width(),
            skipped = report.skipped_lines,
            "Loaded source"
        );

        Ok((frame, report))
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_clean_csv(bytes: Vec<u8>) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(NULL_TOKENS.iter().map(|t| (*t).into()).collect());

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_missing_is_null(true)
                .with_null_values(Some(null_values)),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    Ok(frame)
}

/// Trim header names and suffix repeats: `a`, `a.1`, `a.2`
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw {
        let base = name.trim().to_string();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn texts(frame: &DataFrame, column: &str) -> Vec<Option<String>> {
        frame
            .column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn ints(frame: &DataFrame, column: &str) -> Vec<Option<i64>> {
        frame
            .column(column)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_read_semicolon_latin1() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        // "São Paulo" and "Guarujá" in windows-1252
        temp_file.write_all(b"id;municipio;pessoas;km\n")?;
        temp_file.write_all(b"1;S\xe3o Paulo;3;12,5\n")?;
        temp_file.write_all(b"2;Guaruj\xe1;;7\n")?;

        let reader = SourceReader::new();
        let (frame, report) = reader.read(temp_file.path(), b';', WINDOWS_1252)?;

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_lines, 0);
        assert!(!report.decode_errors);
        assert_eq!(
            texts(&frame, "municipio"),
            vec![Some("São Paulo".to_string()), Some("Guarujá".to_string())]
        );
        assert_eq!(ints(&frame, "pessoas"), vec![Some(3), None]);
        // comma decimals stay text
        assert_eq!(frame.column("km")?.dtype(), &DataType::String);

        Ok(())
    }

    #[test]
    fn test_read_utf8_with_bom() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"\xef\xbb\xbfid,uf\n10,SP\n")?;

        let (frame, _) = SourceReader::new().read(temp_file.path(), b',', UTF_8)?;
        assert_eq!(frame.get_column_names_str(), vec!["id", "uf"]);
        assert_eq!(frame.height(), 1);

        Ok(())
    }

    #[test]
    fn test_malformed_lines_skipped() -> Result<()> {
        let text = "id,uf,pessoas\n1,SP,2\n2,RJ,3,extra\n3,MG\n";
        let (frame, report) = SourceReader::new().read_str(text, b',', "test")?;

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(ints(&frame, "id"), vec![Some(1), Some(3)]);
        assert_eq!(ints(&frame, "pessoas"), vec![Some(2), None]);

        Ok(())
    }

    #[test]
    fn test_lines_without_values_skipped() -> Result<()> {
        let text = "id;uf;pessoas\n1;SP;2\n   \n;;\nNA; ;null\n2;RJ;4\n";
        let (frame, report) = SourceReader::new().read_str(text, b';', "test")?;

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_lines, 3);
        assert_eq!(ints(&frame, "id"), vec![Some(1), Some(2)]);
        assert_eq!(frame.column("uf")?.null_count(), 0);

        Ok(())
    }

    #[test]
    fn test_null_tokens_and_padding() -> Result<()> {
        let text = "id,horario,km\n1,NaN,1.5\n2,07:30:00\n";
        let (frame, _) = SourceReader::new().read_str(text, b',', "test")?;

        assert_eq!(texts(&frame, "horario"), vec![None, Some("07:30:00".to_string())]);
        assert_eq!(
            frame.column("km")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(1.5), None]
        );

        Ok(())
    }

    #[test]
    fn test_max_rows() -> Result<()> {
        let text = "id\n1\n2\n3\n";
        let (frame, report) = SourceReader::with_max_rows(2).read_str(text, b',', "test")?;

        assert_eq!(frame.height(), 2);
        assert_eq!(report.rows, 2);

        Ok(())
    }

    #[test]
    fn test_duplicate_headers() {
        let names = unique_headers(["a", " b ", "a", "a"].into_iter());
        assert_eq!(names, vec!["a", "b", "a.1", "a.2"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = SourceReader::new().read(Path::new("/nonexistent/2021.csv"), b';', UTF_8);
        assert!(matches!(result, Err(ProcessingError::Io(_))));
    }
}
