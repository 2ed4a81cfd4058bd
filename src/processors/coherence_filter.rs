use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{date_view, numeric_view, text_view, ColumnNames};
use crate::utils::constants::VALID_UF_CODES;

/// Evaluation tier; rules run cheapest tier first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCost {
    Presence,
    Membership,
    Range,
    CrossField,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleCheck {
    /// Cell is not null
    NotNull(String),
    /// Cell holds, or parses to, a calendar date
    ValidDate(String),
    /// Cell is one of the allowed values
    MemberOf {
        column: String,
        allowed: HashSet<String>,
    },
    /// Cell parses as a number >= 0
    NonNegative(String),
    /// `lesser <= greater`
    NotGreaterThan { lesser: String, greater: String },
    /// `total == sum(parts)`
    SumEquals { total: String, parts: Vec<String> },
}

/// One named row-level validity rule
#[derive(Debug, Clone, PartialEq)]
pub struct CoherenceRule {
    pub name: String,
    pub cost: RuleCost,
    pub check: RuleCheck,
}

impl CoherenceRule {
    pub fn new(name: impl Into<String>, cost: RuleCost, check: RuleCheck) -> Self {
        Self {
            name: name.into(),
            cost,
            check,
        }
    }

    pub fn required_columns(&self) -> Vec<&str> {
        match &self.check {
            RuleCheck::NotNull(c) | RuleCheck::ValidDate(c) | RuleCheck::NonNegative(c) => {
                vec![c.as_str()]
            }
            RuleCheck::MemberOf { column, .. } => vec![column.as_str()],
            RuleCheck::NotGreaterThan { lesser, greater } => {
                vec![lesser.as_str(), greater.as_str()]
            }
            RuleCheck::SumEquals { total, parts } => std::iter::once(total.as_str())
                .chain(parts.iter().map(String::as_str))
                .collect(),
        }
    }

    pub fn applies_to(&self, frame: &DataFrame) -> bool {
        self.required_columns()
            .iter()
            .all(|column| frame.column(column).is_ok())
    }

    /// Pass mask with one entry per row; a null cell fails the rule. Only
    /// call when `applies_to` holds.
    pub fn evaluate(&self, frame: &DataFrame) -> Result<Vec<bool>> {
        let mut names = self.required_columns();
        names.sort_unstable();
        names.dedup();

        let mut view = Vec::with_capacity(names.len());
        for name in names {
            let column = frame.column(name)?;
            let series = match &self.check {
                RuleCheck::NotNull(_) => column.as_materialized_series().clone(),
                RuleCheck::ValidDate(_) => date_view(column)?,
                RuleCheck::MemberOf { .. } => text_view(column)?,
                _ => numeric_view(column)?,
            };
            view.push(series.into_column());
        }

        let result = DataFrame::new(view)?
            .lazy()
            .select([self.expression().fill_null(lit(false)).alias("pass")])
            .collect()?;

        Ok(result
            .column("pass")?
            .bool()?
            .into_iter()
            .map(|pass| pass.unwrap_or(false))
            .collect())
    }

    fn expression(&self) -> Expr {
        match &self.check {
            RuleCheck::NotNull(c) | RuleCheck::ValidDate(c) => col(c.as_str()).is_not_null(),
            RuleCheck::MemberOf { column, allowed } => {
                let cell = col(column.as_str());
                allowed.iter().fold(
                    cell.clone().is_not_null().and(lit(false)),
                    |any, value| any.or(cell.clone().eq(lit(value.as_str()))),
                )
            }
            RuleCheck::NonNegative(c) => col(c.as_str()).gt_eq(lit(0.0)),
            RuleCheck::NotGreaterThan { lesser, greater } => {
                col(lesser.as_str()).lt_eq(col(greater.as_str()))
            }
            RuleCheck::SumEquals { total, parts } => {
                let sum = parts
                    .iter()
                    .fold(lit(0.0), |sum, part| sum + col(part.as_str()));
                col(total.as_str()).eq(sum)
            }
        }
    }
}

/// Rows in and out of the filter, attributed to the first failing rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoherenceReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    pub dropped_by_rule: Vec<RuleDrops>,
    pub skipped_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDrops {
    pub rule: String,
    pub dropped: usize,
}

impl CoherenceReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_in - self.rows_kept
    }
}

/// Drops rows that break any applicable rule. Rules whose columns are
/// missing from the frame are skipped.
pub struct CoherenceFilter {
    rules: Vec<CoherenceRule>,
}

impl CoherenceFilter {
    pub fn new(rules: Vec<CoherenceRule>) -> Self {
        let mut rules = rules;
        rules.sort_by_key(|r| r.cost);
        Self { rules }
    }

    /// Standard rule set for accident records
    pub fn for_columns(columns: &ColumnNames) -> Self {
        let mut rules = vec![
            CoherenceRule::new(
                "date_is_valid",
                RuleCost::Presence,
                RuleCheck::ValidDate(columns.date.clone()),
            ),
            CoherenceRule::new(
                "id_not_null",
                RuleCost::Presence,
                RuleCheck::NotNull(columns.id.clone()),
            ),
            CoherenceRule::new(
                "state_is_valid",
                RuleCost::Membership,
                RuleCheck::MemberOf {
                    column: columns.state.clone(),
                    allowed: VALID_UF_CODES.iter().map(|s| s.to_string()).collect(),
                },
            ),
            CoherenceRule::new(
                "km_non_negative",
                RuleCost::Range,
                RuleCheck::NonNegative(columns.km.clone()),
            ),
        ];

        for count in columns.count_columns() {
            rules.push(CoherenceRule::new(
                format!("{}_non_negative", count),
                RuleCost::Range,
                RuleCheck::NonNegative(count.to_string()),
            ));
        }

        rules.extend([
            CoherenceRule::new(
                "deaths_not_above_people",
                RuleCost::CrossField,
                RuleCheck::NotGreaterThan {
                    lesser: columns.deaths.clone(),
                    greater: columns.people.clone(),
                },
            ),
            CoherenceRule::new(
                "injured_not_above_people",
                RuleCost::CrossField,
                RuleCheck::NotGreaterThan {
                    lesser: columns.injured.clone(),
                    greater: columns.people.clone(),
                },
            ),
            CoherenceRule::new(
                "injured_is_light_plus_severe",
                RuleCost::CrossField,
                RuleCheck::SumEquals {
                    total: columns.injured.clone(),
                    parts: vec![
                        columns.light_injuries.clone(),
                        columns.severe_injuries.clone(),
                    ],
                },
            ),
        ]);

        Self::new(rules)
    }

    pub fn rules(&self) -> &[CoherenceRule] {
        &self.rules
    }

    pub fn filter(&self, frame: &DataFrame) -> Result<(DataFrame, CoherenceReport)> {
        let (active, skipped): (Vec<&CoherenceRule>, Vec<&CoherenceRule>) =
            self.rules.iter().partition(|rule| rule.applies_to(frame));

        for rule in &skipped {
            debug!(rule = %rule.name, columns = ?rule.required_columns(), "Skipping rule: columns absent");
        }

        let masks = active
            .iter()
            .map(|rule| rule.evaluate(frame))
            .collect::<Result<Vec<_>>>()?;

        let mut drops = vec![0usize; active.len()];
        let keep: BooleanChunked = (0..frame.height())
            .map(|row| match masks.iter().position(|mask| !mask[row]) {
                Some(failed) => {
                    drops[failed] += 1;
                    false
                }
                None => true,
            })
            .collect();

        let filtered = frame.filter(&keep)?;
        let report = CoherenceReport {
            rows_in: frame.height(),
            rows_kept: filtered.height(),
            dropped_by_rule: active
                .iter()
                .zip(drops)
                .map(|(rule, dropped)| RuleDrops {
                    rule: rule.name.clone(),
                    dropped,
                })
                .collect(),
            skipped_rules: skipped.iter().map(|r| r.name.clone()).collect(),
        };

        info!(
            rows_in = report.rows_in,
            rows_kept = report.rows_kept,
            dropped = report.rows_dropped(),
            "Coherence filter applied"
        );

        Ok((filtered, report))
    }
}
