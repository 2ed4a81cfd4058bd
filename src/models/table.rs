//! Helpers over polars frames shared by the processing stages.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::processors::consolidator::parse_date;
use crate::utils::numbers::parse_decimal;

/// Null count of one column at a point in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub nulls: usize,
}

pub fn null_counts(frame: &DataFrame) -> Vec<ColumnNulls> {
    frame
        .get_columns()
        .iter()
        .map(|c| ColumnNulls {
            column: c.name().to_string(),
            nulls: c.null_count(),
        })
        .collect()
}

fn is_number(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Common type for a column seen with two different types
fn widen(current: &DataType, other: &DataType) -> DataType {
    if current == other {
        current.clone()
    } else if is_number(current) && is_number(other) {
        DataType::Float64
    } else {
        DataType::String
    }
}

/// Stack frames vertically, taking the union of their columns in
/// first-seen order. A column whose types disagree across frames is
/// widened (int with float -> float, anything else -> text); a column that
/// is null everywhere it appears adopts the other frames' type.
pub fn concat_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut frames: Vec<DataFrame> = frames.into_iter().filter(|f| f.width() > 0).collect();
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut targets: Vec<(PlSmallStr, Option<DataType>)> = Vec::new();
    for frame in &frames {
        for column in frame.get_columns() {
            let position = match targets.iter().position(|(name, _)| name == column.name()) {
                Some(position) => position,
                None => {
                    targets.push((column.name().clone(), None));
                    targets.len() - 1
                }
            };

            // all-null cells carry no type information
            if column.null_count() < column.len() {
                let target = &mut targets[position].1;
                *target = Some(match target.take() {
                    Some(current) => widen(&current, column.dtype()),
                    None => column.dtype().clone(),
                });
            }
        }
    }

    for frame in frames.iter_mut() {
        for (name, target) in &targets {
            let target = target.clone().unwrap_or(DataType::String);
            let recast = match frame.column(name.as_str()) {
                Ok(column) if column.dtype() != &target => Some(column.cast(&target)?),
                _ => None,
            };
            if let Some(column) = recast {
                debug!(column = %name, dtype = %target, "Harmonized column type");
                frame.with_column(column)?;
            }
        }
    }

    Ok(polars::functions::concat_df_diagonal(&frames)?)
}

/// Float64 view of a column. Text cells are parsed accepting `,` as the
/// decimal separator; cells that do not parse are null.
pub fn numeric_view(column: &Column) -> Result<Series> {
    let series = column.as_materialized_series();
    let view = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|cell| cell.and_then(parse_decimal))
            .collect::<Float64Chunked>()
            .with_name(series.name().clone())
            .into_series(),
        dtype if is_number(dtype) => series.cast(&DataType::Float64)?,
        _ => Series::full_null(series.name().clone(), series.len(), &DataType::Float64),
    };
    Ok(view)
}

/// Date view of a column; text cells are parsed in any accepted layout
pub fn date_view(column: &Column) -> Result<Series> {
    let series = column.as_materialized_series();
    if series.dtype() == &DataType::Date {
        return Ok(series.clone());
    }

    let text = series.cast(&DataType::String)?;
    let dates = DateChunked::from_naive_date_options(
        series.name().clone(),
        text.str()?.into_iter().map(|cell| cell.and_then(parse_date)),
    );
    Ok(dates.into_series())
}

pub fn dates(column: &Column) -> Result<Vec<Option<NaiveDate>>> {
    Ok(date_view(column)?.date()?.as_date_iter().collect())
}

/// Text view of a column, casting other types to their string form
pub fn text_view(column: &Column) -> Result<Series> {
    Ok(column.as_materialized_series().cast(&DataType::String)?)
}
