use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{null_counts, ColumnNulls};
use crate::utils::numbers::format_float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    Median,
    Mode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFill {
    pub column: String,
    pub strategy: FillStrategy,
    pub value: String,
    pub filled: usize,
}

/// Null counts before and after imputation, plus what was substituted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationReport {
    pub before: Vec<ColumnNulls>,
    pub after: Vec<ColumnNulls>,
    pub fills: Vec<ColumnFill>,
}

/// Fills numeric nulls with the column median and text nulls with the
/// column mode. Date columns and columns named with [`NullImputer::skipping`]
/// are left alone.
pub struct NullImputer {
    skip: Vec<String>,
}

impl NullImputer {
    pub fn new() -> Self {
        Self { skip: Vec::new() }
    }

    pub fn skipping(mut self, column: impl Into<String>) -> Self {
        self.skip.push(column.into());
        self
    }

    pub fn impute(&self, frame: &mut DataFrame) -> Result<ImputationReport> {
        let before = null_counts(frame);
        let mut fills = Vec::new();

        for counts in before
            .iter()
            .filter(|c| c.nulls > 0 && !self.skip.contains(&c.column))
        {
            let column = frame.column(&counts.column)?;
            let Some((filled, fill)) = fill_column(column.as_materialized_series(), counts.nulls)?
            else {
                continue;
            };

            debug!(
                column = %fill.column,
                strategy = ?fill.strategy,
                value = %fill.value,
                filled = fill.filled,
                "Imputed nulls"
            );
            frame.with_column(filled)?;
            fills.push(fill);
        }

        let after = null_counts(frame);
        Ok(ImputationReport {
            before,
            after,
            fills,
        })
    }
}

impl Default for NullImputer {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_column(series: &Series, nulls: usize) -> Result<Option<(Series, ColumnFill)>> {
    let name = series.name().to_string();
    if series.null_count() == series.len() {
        warn!(column = %name, "No values to fill nulls from");
        return Ok(None);
    }

    let fill = |strategy, value: String| ColumnFill {
        column: name.clone(),
        strategy,
        value,
        filled: nulls,
    };

    let dtype = series.dtype();
    if dtype.is_integer() || dtype.is_float() {
        let Some(median) = series.median() else {
            return Ok(None);
        };

        // an exact median keeps an integer column integral
        if dtype.is_integer() && median.fract() == 0.0 {
            let filled = series
                .cast(&DataType::Int64)?
                .i64()?
                .fill_null_with_values(median as i64)?
                .into_series();
            return Ok(Some((filled, fill(FillStrategy::Median, (median as i64).to_string()))));
        }

        let filled = series
            .cast(&DataType::Float64)?
            .f64()?
            .fill_null_with_values(median)?
            .into_series();
        return Ok(Some((filled, fill(FillStrategy::Median, format_float(median)))));
    }

    if dtype == &DataType::String {
        let Some(mode) = most_frequent(series)? else {
            return Ok(None);
        };
        let filled = series
            .str()?
            .into_iter()
            .map(|cell| Some(cell.unwrap_or(mode.as_str())))
            .collect::<StringChunked>()
            .with_name(series.name().clone())
            .into_series();
        return Ok(Some((filled, fill(FillStrategy::Mode, mode))));
    }

    Ok(None)
}

/// Most frequent non-null text value; ties go to the smallest value
fn most_frequent(series: &Series) -> Result<Option<String>> {
    let name = series.name().clone();
    let modes = DataFrame::new(vec![series.clone().into_column()])?
        .lazy()
        .select([col(name)
            .drop_nulls()
            .mode()
            .sort(SortOptions::default())
            .first()
            .alias("mode")])
        .collect()?;

    Ok(modes.column("mode")?.str()?.get(0).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::df;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_ties_pick_smallest() -> Result<()> {
        let ties = Series::new(
            "condicao_metereologica".into(),
            &[Some("Sol"), Some("Chuva"), Some("Sol"), Some("Chuva"), Some("Nublado"), None],
        );
        assert_eq!(most_frequent(&ties)?, Some("Chuva".to_string()));

        let clear = Series::new("x".into(), &["b", "a", "b"]);
        assert_eq!(most_frequent(&clear)?, Some("b".to_string()));

        Ok(())
    }

    #[test]
    fn test_impute_numeric_and_text() -> Result<()> {
        let mut frame = df!(
            "pessoas" => [Some(1i64), None, Some(5), Some(3)],
            "km" => [None, Some(2.5f64), Some(0.5), None],
            "condicao_metereologica" => [Some("Sol"), Some("Chuva"), None, Some("Sol")],
            "uf" => ["SP", "RJ", "MG", "BA"],
        )?;

        let report = NullImputer::new().impute(&mut frame)?;

        assert_eq!(
            frame.column("pessoas")?.i64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(1), Some(3), Some(5), Some(3)]
        );
        assert_eq!(
            frame.column("km")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(1.5), Some(2.5), Some(0.5), Some(1.5)]
        );
        assert_eq!(
            frame.column("condicao_metereologica")?.str()?.get(2),
            Some("Sol")
        );

        assert_eq!(
            report.before.iter().map(|c| c.nulls).collect::<Vec<_>>(),
            vec![1, 2, 1, 0]
        );
        assert!(report.after.iter().all(|c| c.nulls == 0));
        assert_eq!(report.fills.len(), 3);
        assert_eq!(report.fills[0].value, "3");
        assert!(report.fills.iter().all(|f| f.column != "uf"));

        Ok(())
    }

    #[test]
    fn test_half_way_int_median_promotes_to_float() -> Result<()> {
        let mut frame = df!("veiculos" => [Some(1i64), Some(2), None])?;

        let report = NullImputer::new().impute(&mut frame)?;

        assert_eq!(
            frame.column("veiculos")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(1.0), Some(2.0), Some(1.5)]
        );
        assert_eq!(report.fills[0].value, "1.5");
        assert_eq!(report.fills[0].strategy, FillStrategy::Median);

        Ok(())
    }

    #[test]
    fn test_all_null_and_date_columns_untouched() -> Result<()> {
        let dates = DateChunked::from_naive_date_options(
            "data_inversa".into(),
            [NaiveDate::from_ymd_opt(2021, 1, 1), None],
        );
        let mut frame = DataFrame::new(vec![
            Series::new("vazio".into(), &[None::<&str>, None]).into_column(),
            dates.into_series().into_column(),
        ])?;

        let report = NullImputer::new().impute(&mut frame)?;

        assert!(report.fills.is_empty());
        assert_eq!(report.after, report.before);
        assert_eq!(frame.column("data_inversa")?.null_count(), 1);

        Ok(())
    }

    #[test]
    fn test_skipped_column_keeps_nulls() -> Result<()> {
        let mut frame = df!(
            "ano" => [Some(2021i64), Some(2024), None],
            "pessoas" => [Some(2i64), None, Some(4)],
        )?;

        let report = NullImputer::new().skipping("ano").impute(&mut frame)?;

        assert_eq!(frame.column("ano")?.null_count(), 1);
        assert_eq!(frame.column("ano")?.dtype(), &DataType::Int64);
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].column, "pessoas");

        Ok(())
    }
}
