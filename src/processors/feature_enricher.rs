use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{dates, numeric_view, text_view, ColumnNames, InvolvementTier, TimeOfDay};
use crate::utils::constants::*;
use crate::utils::holidays::HolidayCalendar;
use crate::utils::numbers::parse_hour;

/// Appends calendar, time-of-day and involvement columns
pub struct FeatureEnricher<'a> {
    columns: &'a ColumnNames,
    calendar: &'a dyn HolidayCalendar,
}

impl<'a> FeatureEnricher<'a> {
    pub fn new(columns: &'a ColumnNames, calendar: &'a dyn HolidayCalendar) -> Self {
        Self { columns, calendar }
    }

    pub fn enrich(&self, frame: &mut DataFrame) -> Result<()> {
        let parsed = match frame.column(&self.columns.date) {
            Ok(column) => Some(dates(column)?),
            Err(_) => None,
        };
        match parsed {
            Some(parsed) => self.add_date_features(frame, &parsed)?,
            None => warn!(column = %self.columns.date, "Date column absent; no calendar features"),
        }

        let buckets = match frame.column(&self.columns.time) {
            Ok(column) => Some(time_buckets(column)?),
            Err(_) => None,
        };
        match buckets {
            Some(buckets) => {
                frame.with_column(buckets)?;
            }
            None => warn!(column = %self.columns.time, "Time column absent; no time-of-day bucket"),
        }

        let tiers = match frame.column(&self.columns.people) {
            Ok(column) => Some(involvement_tiers(column)?),
            Err(_) => None,
        };
        match tiers {
            Some(tiers) => {
                frame.with_column(tiers)?;
            }
            None => warn!(column = %self.columns.people, "People column absent; no involvement tier"),
        }

        info!(columns = frame.width(), "Derived feature columns");
        Ok(())
    }

    fn add_date_features(&self, frame: &mut DataFrame, dates: &[Option<NaiveDate>]) -> Result<()> {
        let weekdays: StringChunked = dates
            .iter()
            .map(|d| d.map(|d| d.format("%A").to_string()))
            .collect();
        let months: Int64Chunked = dates.iter().map(|d| d.map(|d| d.month() as i64)).collect();
        let month_names: StringChunked = dates
            .iter()
            .map(|d| d.map(|d| d.format("%B").to_string()))
            .collect();
        let years: Int64Chunked = dates.iter().map(|d| d.map(|d| d.year() as i64)).collect();

        frame.with_column(weekdays.with_name(WEEKDAY_COLUMN.into()).into_series())?;
        frame.with_column(months.with_name(MONTH_COLUMN.into()).into_series())?;
        frame.with_column(month_names.with_name(MONTH_NAME_COLUMN.into()).into_series())?;
        frame.with_column(years.with_name(self.columns.year.as_str().into()).into_series())?;
        frame.with_column(self.holiday_flags(dates))?;
        Ok(())
    }

    fn holiday_flags(&self, dates: &[Option<NaiveDate>]) -> Series {
        let years: BTreeSet<i32> = dates.iter().flatten().map(|d| d.year()).collect();
        let holidays: HashMap<i32, HashSet<NaiveDate>> = years
            .into_iter()
            .map(|year| (year, self.calendar.holidays(year)))
            .collect();

        dates
            .iter()
            .map(|d| {
                d.map(|d| {
                    let is_holiday = holidays
                        .get(&d.year())
                        .is_some_and(|set| set.contains(&d));
                    if is_holiday {
                        HOLIDAY_YES
                    } else {
                        HOLIDAY_NO
                    }
                })
            })
            .collect::<StringChunked>()
            .with_name(HOLIDAY_COLUMN.into())
            .into_series()
    }
}

fn time_buckets(column: &Column) -> Result<Series> {
    let text = text_view(column)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|cell| {
            cell.and_then(parse_hour)
                .and_then(TimeOfDay::from_hour)
                .map(|bucket| bucket.label())
        })
        .collect::<StringChunked>()
        .with_name(TIME_BUCKET_COLUMN.into())
        .into_series())
}

fn involvement_tiers(column: &Column) -> Result<Series> {
    let people = numeric_view(column)?;
    Ok(people
        .f64()?
        .into_iter()
        .map(|cell| cell.map(|people| InvolvementTier::from_people(people).label()))
        .collect::<StringChunked>()
        .with_name(INVOLVEMENT_COLUMN.into())
        .into_series())
}
