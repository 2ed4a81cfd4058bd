use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ProcessingError, Result};
use crate::models::{dates, numeric_view, text_view, ColumnNames, InvolvementTier, TimeOfDay};
use crate::utils::constants::{HOLIDAY_COLUMN, HOLIDAY_YES, INVOLVEMENT_COLUMN, TIME_BUCKET_COLUMN};

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AccidentStatistics {
    pub total_records: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub records_per_year: BTreeMap<i32, usize>,
    pub top_states: Vec<(String, usize)>,
    pub top_accident_types: Vec<(String, usize)>,
    pub casualties: Casualties,
    pub time_buckets: Vec<(String, usize)>,
    pub involvement_tiers: Vec<(String, usize)>,
    pub holiday_records: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Casualties {
    pub deaths: f64,
    pub injured: f64,
    pub severe_injuries: f64,
    pub light_injuries: f64,
}

impl AccidentStatistics {
    pub fn holiday_percentage(&self) -> Option<f64> {
        self.holiday_records.map(|count| {
            if self.total_records == 0 {
                0.0
            } else {
                count as f64 / self.total_records as f64 * 100.0
            }
        })
    }

    pub fn summary(&self) -> String {
        let range = match self.date_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "unknown".to_string(),
        };

        format!(
            "Records: {} total\n\
            Date Range: {}\n\
            Deaths: {}, Injured: {} ({} severe, {} light)",
            self.total_records,
            range,
            self.casualties.deaths,
            self.casualties.injured,
            self.casualties.severe_injuries,
            self.casualties.light_injuries,
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();

        if !self.records_per_year.is_empty() {
            out.push_str("\n\nRecords per Year:");
            for (year, count) in &self.records_per_year {
                out.push_str(&format!("\n- {}: {}", year, count));
            }
        }

        self.push_ranking(&mut out, "Top States", &self.top_states);
        self.push_ranking(&mut out, "Top Accident Types", &self.top_accident_types);
        self.push_ranking(&mut out, "Time of Day", &self.time_buckets);
        self.push_ranking(&mut out, "Involvement", &self.involvement_tiers);

        if let (Some(count), Some(pct)) = (self.holiday_records, self.holiday_percentage()) {
            out.push_str(&format!("\n\nOn Holidays: {} ({:.1}%)", count, pct));
        }

        out
    }

    fn push_ranking(&self, out: &mut String, title: &str, entries: &[(String, usize)]) {
        if entries.is_empty() {
            return;
        }
        out.push_str(&format!("\n\n{}:", title));
        for (label, count) in entries {
            let pct = if self.total_records == 0 {
                0.0
            } else {
                *count as f64 / self.total_records as f64 * 100.0
            };
            out.push_str(&format!("\n- {}: {} ({:.1}%)", label, count, pct));
        }
    }
}

/// Summary statistics over a consolidated accident table
pub struct AccidentAnalyzer<'a> {
    columns: &'a ColumnNames,
}

impl<'a> AccidentAnalyzer<'a> {
    pub fn new(columns: &'a ColumnNames) -> Self {
        Self { columns }
    }

    pub fn analyze(&self, frame: &DataFrame) -> Result<AccidentStatistics> {
        if frame.height() == 0 {
            return Err(ProcessingError::InvalidFormat(
                "No records to analyze".to_string(),
            ));
        }

        let known_dates: Vec<NaiveDate> = match frame.column(&self.columns.date) {
            Ok(column) => dates(column)?.into_iter().flatten().collect(),
            Err(_) => Vec::new(),
        };

        let date_range = known_dates
            .iter()
            .min()
            .copied()
            .zip(known_dates.iter().max().copied());

        let mut records_per_year = BTreeMap::new();
        for date in &known_dates {
            *records_per_year.entry(date.year()).or_insert(0) += 1;
        }

        let casualties = Casualties {
            deaths: self.total(frame, &self.columns.deaths)?,
            injured: self.total(frame, &self.columns.injured)?,
            severe_injuries: self.total(frame, &self.columns.severe_injuries)?,
            light_injuries: self.total(frame, &self.columns.light_injuries)?,
        };

        let time_order: Vec<&str> = TimeOfDay::ALL.iter().map(|b| b.label()).collect();
        let tier_order: Vec<&str> = InvolvementTier::ALL.iter().map(|t| t.label()).collect();

        let holiday_records = match frame.column(HOLIDAY_COLUMN) {
            Ok(column) => Some(
                value_counts(column)?
                    .get(HOLIDAY_YES)
                    .copied()
                    .unwrap_or(0),
            ),
            Err(_) => None,
        };

        Ok(AccidentStatistics {
            total_records: frame.height(),
            date_range,
            records_per_year,
            top_states: top_counts(frame.column(&self.columns.state).ok(), TOP_N)?,
            top_accident_types: top_counts(frame.column(&self.columns.accident_type).ok(), TOP_N)?,
            casualties,
            time_buckets: ordered_counts(frame.column(TIME_BUCKET_COLUMN).ok(), &time_order)?,
            involvement_tiers: ordered_counts(frame.column(INVOLVEMENT_COLUMN).ok(), &tier_order)?,
            holiday_records,
        })
    }

    fn total(&self, frame: &DataFrame, column: &str) -> Result<f64> {
        match frame.column(column) {
            Ok(column) => Ok(numeric_view(column)?.f64()?.sum().unwrap_or(0.0)),
            Err(_) => Ok(0.0),
        }
    }
}

/// Non-null value counts, grouped by the value's text form
fn value_counts(column: &Column) -> Result<HashMap<String, usize>> {
    let text = text_view(column)?;
    let name = text.name().clone();

    let grouped = DataFrame::new(vec![text.into_column()])?
        .lazy()
        .filter(col(name.clone()).is_not_null())
        .group_by([col(name.clone())])
        .agg([len().alias("records")])
        .collect()?;

    let values = grouped.column(name.as_str())?.str()?;
    let records = grouped.column("records")?.cast(&DataType::UInt64)?;

    Ok(values
        .into_iter()
        .zip(records.u64()?.into_iter())
        .filter_map(|(value, count)| Some((value?.to_string(), count? as usize)))
        .collect())
}

/// Most frequent values, count descending then value ascending
fn top_counts(column: Option<&Column>, n: usize) -> Result<Vec<(String, usize)>> {
    let Some(column) = column else {
        return Ok(Vec::new());
    };

    let mut counts: Vec<(String, usize)> = value_counts(column)?.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(n);
    Ok(counts)
}

fn ordered_counts(column: Option<&Column>, order: &[&str]) -> Result<Vec<(String, usize)>> {
    let Some(column) = column else {
        return Ok(Vec::new());
    };

    let counts = value_counts(column)?;
    Ok(order
        .iter()
        .map(|label| (label.to_string(), counts.get(*label).copied().unwrap_or(0)))
        .collect())
}
