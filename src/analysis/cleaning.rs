//! Impact of the upstream cleaning flag on the readings.

use super::summary::{summarize_columns, Statistic, SummaryResult};
use super::{ensure_rows, AnalysisError};
use crate::charts::{BarGroup, BarGroups, Chart, Layer, Panel};
use crate::data::DataProcessor;
use crate::stats::{StatsCalculator, TTest};
use polars::prelude::*;
use serde::Serialize;

/// Cleaned-minus-uncleaned differences for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDelta {
    pub column: String,
    /// One entry per `Statistic::ALL`, in that order.
    pub deltas: Vec<(Statistic, f64)>,
    /// Welch's t-test on the two partitions; `None` with fewer than two values per side.
    pub ttest: Option<TTest>,
}

impl ColumnDelta {
    pub fn delta(&self, statistic: Statistic) -> Option<f64> {
        self.deltas
            .iter()
            .find(|(s, _)| *s == statistic)
            .map(|(_, d)| *d)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningImpact {
    pub site: String,
    pub cleaning_column: String,
    pub cleaned: SummaryResult,
    pub uncleaned: SummaryResult,
    pub deltas: Vec<ColumnDelta>,
}

impl CleaningImpact {
    pub fn column(&self, name: &str) -> Option<&ColumnDelta> {
        self.deltas.iter().find(|d| d.column == name)
    }
}

/// Compare the rows where cleaning was applied with the rows where it was not.
///
/// Non-zero (or `true`) flag values mean "applied"; rows with a missing flag
/// belong to neither side. The flag column itself is left out of the comparison.
pub fn evaluate_cleaning_impact(
    df: &DataFrame,
    site: &str,
    cleaning_column: &str,
) -> Result<CleaningImpact, AnalysisError> {
    ensure_rows(df)?;
    let flag_column = df
        .column(cleaning_column)
        .map_err(|_| AnalysisError::MissingColumn(cleaning_column.to_string()))?;
    if !DataProcessor::is_flag(flag_column.dtype()) {
        return Err(AnalysisError::NonNumericColumn(cleaning_column.to_string()));
    }

    let flags = DataProcessor::column_values(df, cleaning_column)?;
    let (mut cleaned_rows, mut uncleaned_rows) = (Vec::new(), Vec::new());
    for (row, flag) in flags.iter().enumerate() {
        match flag {
            Some(f) if *f != 0.0 => cleaned_rows.push(row),
            Some(_) => uncleaned_rows.push(row),
            None => {}
        }
    }

    if cleaned_rows.is_empty() || uncleaned_rows.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "cleaning impact needs both partitions ({} cleaned, {} not cleaned rows)",
            cleaned_rows.len(),
            uncleaned_rows.len()
        )));
    }

    let cleaned_df = DataProcessor::take_rows(df, &cleaned_rows)?;
    let uncleaned_df = DataProcessor::take_rows(df, &uncleaned_rows)?;

    let columns: Vec<String> = DataProcessor::numeric_columns(df)
        .into_iter()
        .filter(|name| name != cleaning_column)
        .collect();

    let cleaned = summarize_columns(&cleaned_df, site, &columns)?;
    let uncleaned = summarize_columns(&uncleaned_df, site, &columns)?;

    let mut deltas = Vec::with_capacity(columns.len());
    for ((name, after), before) in columns
        .iter()
        .zip(cleaned.columns.iter())
        .zip(uncleaned.columns.iter())
    {
        let ttest = StatsCalculator::perform_ttest(
            &DataProcessor::present_values(&cleaned_df, name)?,
            &DataProcessor::present_values(&uncleaned_df, name)?,
        );
        deltas.push(ColumnDelta {
            column: name.clone(),
            deltas: Statistic::ALL
                .iter()
                .map(|&s| (s, after.get(s) - before.get(s)))
                .collect(),
            ttest,
        });
    }

    log::debug!(
        "Cleaning impact for {}: {} cleaned / {} uncleaned rows",
        site,
        cleaned_rows.len(),
        uncleaned_rows.len()
    );

    Ok(CleaningImpact {
        site: site.to_string(),
        cleaning_column: cleaning_column.to_string(),
        cleaned,
        uncleaned,
        deltas,
    })
}

/// Grouped bars of column means with and without cleaning.
///
/// `columns` picks the categories; an empty list shows every compared column.
pub fn cleaning_impact_chart(impact: &CleaningImpact, columns: &[String]) -> Chart {
    let categories: Vec<String> = if columns.is_empty() {
        impact.deltas.iter().map(|d| d.column.clone()).collect()
    } else {
        columns
            .iter()
            .filter(|c| impact.cleaned.column(c).is_some())
            .cloned()
            .collect()
    };

    let means = |summary: &SummaryResult| -> Vec<f64> {
        categories
            .iter()
            .map(|c| summary.get(c, Statistic::Mean).unwrap_or(f64::NAN))
            .collect()
    };

    let bars = BarGroups {
        groups: vec![
            BarGroup {
                name: "Not cleaned".to_string(),
                values: means(&impact.uncleaned),
            },
            BarGroup {
                name: "Cleaned".to_string(),
                values: means(&impact.cleaned),
            },
        ],
        categories,
    };

    Chart::new(
        format!("Impact of Cleaning ({})", impact.site),
        vec![Panel::new("Mean reading by cleaning state", Layer::Bars(bars))
            .with_axes("Sensor", "Mean value")],
    )
}
