use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::models::{OutputFormat, PipelineConfig};
use crate::processors::{
    CoherenceFilter, CoherenceReport, Consolidator, Deduplicator, FeatureEnricher, FileLoad,
    ImputationReport, NullImputer,
};
use crate::utils::holidays::{BrazilHolidays, HolidayCalendar};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};

/// What each stage did during one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationReport {
    pub sources: Vec<FileLoad>,
    pub rows_loaded: usize,
    pub imputation: ImputationReport,
    pub duplicates_removed: usize,
    pub coherence: CoherenceReport,
    pub rows_final: usize,
    pub columns_final: usize,
}

impl ConsolidationReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Consolidation Report ===\n");
        for source in &self.sources {
            let status = if source.failed { "FAILED" } else { "ok" };
            summary.push_str(&format!(
                "  {} [{} / '{}']: {} rows, {} skipped lines ({})\n",
                source.file,
                source.encoding,
                source.delimiter,
                source.rows,
                source.skipped_lines,
                status
            ));
        }
        summary.push_str(&format!("Rows Loaded: {}\n", self.rows_loaded));

        summary.push_str("\nNull Imputation:\n");
        if self.imputation.fills.is_empty() {
            summary.push_str("  No null values found\n");
        }
        for fill in &self.imputation.fills {
            summary.push_str(&format!(
                "  {}: {} nulls -> {:?} '{}'\n",
                fill.column, fill.filled, fill.strategy, fill.value
            ));
        }

        summary.push_str(&format!(
            "\nDuplicate Rows Removed: {}\n",
            self.duplicates_removed
        ));

        summary.push_str(&format!(
            "\nCoherence Filter: kept {} of {} rows ({:.1}%)\n",
            self.coherence.rows_kept,
            self.coherence.rows_in,
            percentage(self.coherence.rows_kept, self.coherence.rows_in)
        ));
        for drops in self.coherence.dropped_by_rule.iter().filter(|d| d.dropped > 0) {
            summary.push_str(&format!("  {}: {} dropped\n", drops.rule, drops.dropped));
        }
        if !self.coherence.skipped_rules.is_empty() {
            summary.push_str(&format!(
                "  Skipped (columns absent): {}\n",
                self.coherence.skipped_rules.join(", ")
            ));
        }

        summary.push_str(&format!(
            "\nFinal Table: {} rows x {} columns\n",
            self.rows_final, self.columns_final
        ));

        summary
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Consolidated table plus the per-stage report
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub frame: DataFrame,
    pub report: ConsolidationReport,
}

/// Load -> consolidate -> impute -> deduplicate -> filter -> enrich -> persist
pub struct AccidentPipeline {
    config: PipelineConfig,
    calendar: Box<dyn HolidayCalendar>,
}

impl AccidentPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            calendar: Box::new(BrazilHolidays::new()),
        }
    }

    pub fn with_calendar(mut self, calendar: Box<dyn HolidayCalendar>) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage up to, but not including, persistence
    pub fn consolidate(&self, progress: Option<&ProgressReporter>) -> Result<Consolidation> {
        let step = |message: &str| {
            if let Some(p) = progress {
                p.set_message(message);
            }
        };

        step("Loading source files...");
        let (mut frame, sources) = Consolidator::new(&self.config).consolidate()?;
        let rows_loaded = frame.height();

        step("Imputing null values...");
        // the year is derived from the date, never imputed
        let imputation = NullImputer::new()
            .skipping(self.config.columns.year.as_str())
            .impute(&mut frame)?;

        step("Removing duplicate rows...");
        let (frame, duplicates_removed) = Deduplicator::new().deduplicate(&frame)?;

        step("Checking record coherence...");
        let (mut frame, coherence) =
            CoherenceFilter::for_columns(&self.config.columns).filter(&frame)?;

        step("Deriving features...");
        FeatureEnricher::new(&self.config.columns, self.calendar.as_ref()).enrich(&mut frame)?;

        let report = ConsolidationReport {
            sources,
            rows_loaded,
            imputation,
            duplicates_removed,
            coherence,
            rows_final: frame.height(),
            columns_final: frame.width(),
        };

        info!(
            rows_loaded,
            rows_final = report.rows_final,
            columns = report.columns_final,
            "Consolidation complete"
        );

        Ok(Consolidation { frame, report })
    }

    /// Write the table to the configured output path, overwriting it
    pub fn persist(&self, frame: &DataFrame) -> Result<PathBuf> {
        let path = self.config.output_path();

        match self.config.output_format {
            OutputFormat::Csv => CsvWriter::new().write_frame(frame, &path)?,
            OutputFormat::Parquet => ParquetWriter::new()
                .with_compression(&self.config.compression)?
                .write_frame(frame, &path)?,
        }

        info!(path = %path.display(), rows = frame.height(), "Wrote consolidated output");
        Ok(path)
    }

    /// Consolidate and persist. Nothing is written if any stage fails.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<(Consolidation, PathBuf)> {
        let consolidation = self.consolidate(progress)?;

        if let Some(p) = progress {
            p.set_message("Writing output...");
        }
        let path = self.persist(&consolidation.frame)?;

        Ok((consolidation, path))
    }
}
