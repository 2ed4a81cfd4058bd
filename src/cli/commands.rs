use encoding_rs::UTF_8;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::analyzers::AccidentAnalyzer;
use crate::cli::args::{Cli, Commands, SourceArgs};
use crate::error::{ProcessingError, Result};
use crate::models::{OutputFormat, PipelineConfig};
use crate::processors::{parse_date_column, AccidentPipeline, ConsolidationReport};
use crate::readers::{EncodingPolicy, SourceReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process {
            source,
            output_file,
            format,
            compression,
            validate_only,
            report_json,
        } => {
            let mut config = load_config(&source)?;
            if let Some(output_file) = output_file {
                config = config.with_output_file(output_file);
            }
            if let Some(format) = format {
                config = config.with_output_format(format);
            }
            if let Some(compression) = compression {
                config = config.with_compression(compression);
            }
            config.check()?;

            println!("Processing accident data...");
            println!("Data directory: {}", config.data_dir.display());
            if !validate_only {
                println!("Output file: {}", config.output_path().display());
            }

            let progress = if cli.quiet {
                ProgressReporter::silent()
            } else {
                ProgressReporter::new_spinner("Consolidating source files...", false)
            };

            let pipeline = AccidentPipeline::new(config);
            let consolidation = pipeline.consolidate(Some(&progress))?;

            progress.finish_with_message(&format!(
                "Consolidated {} rows",
                consolidation.report.rows_final
            ));

            println!("\n{}", consolidation.report.summary());

            if let Some(path) = report_json {
                write_report_json(&consolidation.report, &path)?;
                println!("Report written to {}", path.display());
            }

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            let output = pipeline.persist(&consolidation.frame)?;

            if pipeline.config().output_format == OutputFormat::Parquet {
                let file_info = ParquetWriter::new().get_file_info(&output)?;
                println!("\n{}", file_info.summary());
            }

            if consolidation.frame.height() > 0 {
                let stats = AccidentAnalyzer::new(&pipeline.config().columns)
                    .analyze(&consolidation.frame)?;
                println!("\n{}", stats.detailed_summary());
            }

            println!("\nProcessing complete! Wrote {}", output.display());
        }

        Commands::Check { source } => {
            let config = load_config(&source)?;
            println!("Checking source files in {}", config.data_dir.display());

            let missing = config.missing_files();
            for file in config.source_files() {
                let status = if missing.iter().any(|m| m == file) {
                    "MISSING"
                } else {
                    "found"
                };
                println!("  {:<12} {}", file, status);
            }

            if !missing.is_empty() {
                return Err(ProcessingError::MissingSourceFiles {
                    dir: config.data_dir.clone(),
                    files: missing,
                });
            }

            println!("✅ All source files present");
        }

        Commands::Preview { source, file, rows } => {
            let config = load_config(&source)?;
            let group = config.group_of(&file).ok_or_else(|| {
                ProcessingError::Config(format!("{} is not a declared source file", file))
            })?;

            let path = config.data_dir.join(&file);
            if !path.is_file() {
                return Err(ProcessingError::MissingSourceFiles {
                    dir: config.data_dir.clone(),
                    files: vec![file],
                });
            }

            let encoding = EncodingPolicy::from_config(&config)?.for_file(&path);
            let (frame, report) = SourceReader::with_max_rows(rows).read(
                &path,
                group.delimiter_byte()?,
                encoding,
            )?;

            println!(
                "{} (delimiter '{}', encoding {}): showing {} rows, {} columns",
                file,
                group.delimiter,
                encoding.name(),
                frame.height(),
                frame.width()
            );
            if report.skipped_lines > 0 {
                println!("Skipped {} malformed lines", report.skipped_lines);
            }
            println!("{}", frame);
        }

        Commands::Info { file, config } => {
            println!("Analyzing consolidated file: {}", file.display());

            let is_parquet = file
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
            if is_parquet {
                let file_info = ParquetWriter::new().get_file_info(&file)?;
                println!("\n{}", file_info.summary());
                return Ok(());
            }

            let config = PipelineConfig::load(config.as_deref())?;
            let (mut frame, _) = SourceReader::new().read(&file, b',', UTF_8)?;
            parse_date_column(&mut frame, &config.columns.date, &config.columns.year)?;

            let stats = AccidentAnalyzer::new(&config.columns).analyze(&frame)?;
            println!("\n{}", stats.detailed_summary());
            println!(
                "\nColumns ({}): {}",
                frame.width(),
                frame.get_column_names_str().join(", ")
            );
        }
    }

    Ok(())
}

/// Settings file and environment first, then command-line overrides
fn load_config(source: &SourceArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(source.config.as_deref())?;
    if let Some(data_dir) = &source.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    Ok(config)
}

fn write_report_json(report: &ConsolidationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!(path = %path.display(), "Wrote stage report");
    Ok(())
}
