//! Descriptive statistics per numeric column.

use super::{ensure_rows, AnalysisError};
use crate::data::DataProcessor;
use crate::stats::{DescriptiveStats, StatsCalculator};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

/// Statistic names in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Statistic {
    Count,
    Mean,
    Std,
    Min,
    Q25,
    Median,
    Q75,
    Max,
}

impl Statistic {
    pub const ALL: [Statistic; 8] = [
        Statistic::Count,
        Statistic::Mean,
        Statistic::Std,
        Statistic::Min,
        Statistic::Q25,
        Statistic::Median,
        Statistic::Q75,
        Statistic::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Q25 => "25%",
            Statistic::Median => "50%",
            Statistic::Q75 => "75%",
            Statistic::Max => "max",
        }
    }

    pub fn value(self, stats: &DescriptiveStats) -> f64 {
        match self {
            Statistic::Count => stats.count as f64,
            Statistic::Mean => stats.mean,
            Statistic::Std => stats.std,
            Statistic::Min => stats.min,
            Statistic::Q25 => stats.q25,
            Statistic::Median => stats.median,
            Statistic::Q75 => stats.q75,
            Statistic::Max => stats.max,
        }
    }
}

/// Statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    #[serde(flatten)]
    pub stats: DescriptiveStats,
}

impl ColumnSummary {
    pub fn get(&self, statistic: Statistic) -> f64 {
        statistic.value(&self.stats)
    }
}

/// Summary of every numeric column of a table, in table order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub site: String,
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
}

impl SummaryResult {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn get(&self, column: &str, statistic: Statistic) -> Option<f64> {
        self.column(column).map(|c| c.get(statistic))
    }
}

/// Count, mean, std, min, quartiles and max of every numeric column.
///
/// Non-numeric columns are skipped. Nulls and NaN do not count as values.
pub fn summary_statistics(df: &DataFrame, site: &str) -> Result<SummaryResult, AnalysisError> {
    ensure_rows(df)?;
    summarize_columns(df, site, &DataProcessor::numeric_columns(df))
}

/// Summary restricted to the given numeric columns. Callers check the names exist.
pub(crate) fn summarize_columns(
    df: &DataFrame,
    site: &str,
    columns: &[String],
) -> Result<SummaryResult, AnalysisError> {
    let columns = columns
        .par_iter()
        .map(|name| {
            let values = DataProcessor::present_values(df, name)?;
            Ok(ColumnSummary {
                column: name.clone(),
                stats: StatsCalculator::compute_descriptive_stats(&values),
            })
        })
        .collect::<Result<Vec<_>, PolarsError>>()?;

    log::debug!("Summarized {} columns for {}", columns.len(), site);

    Ok(SummaryResult {
        site: site.to_string(),
        row_count: df.height(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn site_table() -> DataFrame {
        df! {
            "Timestamp" => ["t0", "t1", "t2", "t3", "t4"],
            "GHI" => [Some(0.0f64), Some(120.5), Some(480.0), None, Some(810.25)],
            "Tamb" => [24.1f64, 25.3, 27.8, 29.0, 30.2],
            "Cleaning" => [0i64, 0, 1, 0, 0],
        }
        .unwrap()
    }

    #[test]
    fn test_one_entry_per_numeric_column() {
        let summary = summary_statistics(&site_table(), "Benin").unwrap();

        let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["GHI", "Tamb", "Cleaning"]);
        assert_eq!(summary.site, "Benin");
        assert_eq!(summary.row_count, 5);
    }

    #[test]
    fn test_quantiles_are_ordered() {
        let summary = summary_statistics(&site_table(), "Benin").unwrap();
        for c in &summary.columns {
            let s = &c.stats;
            assert!(s.min <= s.q25 && s.q25 <= s.median && s.median <= s.q75 && s.q75 <= s.max);
        }
    }

    #[test]
    fn test_nulls_are_not_counted() {
        let summary = summary_statistics(&site_table(), "Benin").unwrap();
        assert_eq!(summary.get("GHI", Statistic::Count), Some(4.0));
        assert_relative_eq!(
            summary.get("GHI", Statistic::Mean).unwrap(),
            (0.0 + 120.5 + 480.0 + 810.25) / 4.0
        );
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let df = df! { "GHI" => Vec::<f64>::new() }.unwrap();
        assert!(matches!(
            summary_statistics(&df, "Benin"),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let df = site_table();
        let first = serde_json::to_string(&summary_statistics(&df, "Benin").unwrap()).unwrap();
        let second = serde_json::to_string(&summary_statistics(&df, "Benin").unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
