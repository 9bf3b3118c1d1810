//! Data quality checks: missing values, IQR outliers and impossible negatives.

use super::{ensure_rows, require_numeric, resolve_numeric_columns, AnalysisError};
use crate::data::DataProcessor;
use crate::stats::{StatsCalculator, IQR_FENCE_FACTOR};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;

/// Decimals kept on missing-value percentages.
const PERCENT_DECIMALS: i32 = 2;

/// Columns prepended to the flagged source rows.
const ANNOTATION_COLUMNS: [&str; 4] = ["row_index", "flagged_column", "flagged_value", "reason"];

/// Prefix for source columns whose name collides with an annotation column.
const SOURCE_PREFIX: &str = "source_";

/// Missing values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingReport {
    pub site: String,
    pub total_rows: usize,
    /// Every column of the table, in table order.
    pub columns: Vec<MissingCount>,
}

impl MissingReport {
    pub fn column(&self, name: &str) -> Option<&MissingCount> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Count and percentage of null (or NaN) entries per column.
pub fn check_missing_values(df: &DataFrame, site: &str) -> Result<MissingReport, AnalysisError> {
    ensure_rows(df)?;
    let total_rows = df.height();

    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let name = column.name().to_string();
            let count = if DataProcessor::is_float(column.dtype()) {
                DataProcessor::column_values(df, &name)?
                    .iter()
                    .filter(|v| v.is_none())
                    .count()
            } else {
                column.null_count()
            };
            let percentage = StatsCalculator::round_to(
                count as f64 / total_rows as f64 * 100.0,
                PERCENT_DECIMALS,
            );
            Ok(MissingCount {
                column: name,
                count,
                percentage,
            })
        })
        .collect::<Result<Vec<_>, PolarsError>>()?;

    Ok(MissingReport {
        site: site.to_string(),
        total_rows,
        columns,
    })
}

/// Why a value was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FlagReason {
    Outlier { lower: f64, upper: f64 },
    Negative,
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagReason::Outlier { lower, upper } => {
                write!(f, "outlier (outside [{:.3}, {:.3}])", lower, upper)
            }
            FlagReason::Negative => write!(f, "negative value"),
        }
    }
}

/// One failing (row, column) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagEntry {
    /// Position of the row in the source table.
    pub row: usize,
    pub column: String,
    pub value: f64,
    pub reason: FlagReason,
}

/// Rows that failed a quality predicate.
///
/// `entries` lists every failure ordered by row, then by column order.
/// `frame` holds the annotation columns `row_index`, `flagged_column`,
/// `flagged_value` and `reason`, followed by the source columns of the
/// flagged rows, one frame row per entry.
#[derive(Debug, Clone)]
pub struct FlagTable {
    pub site: String,
    pub entries: Vec<FlagEntry>,
    pub frame: DataFrame,
}

impl FlagTable {
    fn build(df: &DataFrame, site: &str, mut entries: Vec<FlagEntry>) -> PolarsResult<Self> {
        // Stable: entries arrive grouped by column in table order.
        entries.sort_by_key(|e| e.row);

        let rows: Vec<usize> = entries.iter().map(|e| e.row).collect();
        let source = DataProcessor::take_rows(df, &rows)?;

        let mut columns = vec![
            Column::new(
                ANNOTATION_COLUMNS[0].into(),
                rows.iter().map(|&r| r as u64).collect::<Vec<_>>(),
            ),
            Column::new(
                ANNOTATION_COLUMNS[1].into(),
                entries.iter().map(|e| e.column.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                ANNOTATION_COLUMNS[2].into(),
                entries.iter().map(|e| e.value).collect::<Vec<_>>(),
            ),
            Column::new(
                ANNOTATION_COLUMNS[3].into(),
                entries.iter().map(|e| e.reason.to_string()).collect::<Vec<_>>(),
            ),
        ];
        columns.extend(source.get_columns().iter().map(|col| {
            if ANNOTATION_COLUMNS.contains(&col.name().as_str()) {
                col.clone()
                    .with_name(format!("{SOURCE_PREFIX}{}", col.name()).into())
            } else {
                col.clone()
            }
        }));

        Ok(Self {
            site: site.to_string(),
            entries,
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct flagged rows, ascending.
    pub fn rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.entries.iter().map(|e| e.row).collect();
        rows.dedup();
        rows
    }
}

/// Flag values outside the 1.5·IQR fences of their column.
///
/// With `columns = None` every numeric column is checked. Columns whose IQR
/// is zero flag nothing.
pub fn check_outliers(
    df: &DataFrame,
    site: &str,
    columns: Option<&[String]>,
) -> Result<FlagTable, AnalysisError> {
    ensure_rows(df)?;
    let columns = resolve_numeric_columns(df, columns)?;

    let mut entries = Vec::new();
    for name in &columns {
        let values = DataProcessor::column_values(df, name)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();

        let Some((lower, upper)) = StatsCalculator::iqr_fences(&present, IQR_FENCE_FACTOR) else {
            continue;
        };

        entries.extend(values.iter().enumerate().filter_map(|(row, v)| {
            let value = (*v)?;
            (value < lower || value > upper).then(|| FlagEntry {
                row,
                column: name.clone(),
                value,
                reason: FlagReason::Outlier { lower, upper },
            })
        }));
    }

    log::debug!("Outlier check flagged {} values for {}", entries.len(), site);
    Ok(FlagTable::build(df, site, entries)?)
}

/// Flag negative readings in columns that are physically non-negative.
///
/// Every listed column must exist; columns not listed are never checked.
pub fn check_negative_values(
    df: &DataFrame,
    site: &str,
    columns: &[String],
) -> Result<FlagTable, AnalysisError> {
    ensure_rows(df)?;
    for name in columns {
        require_numeric(df, name)?;
    }

    let mut entries = Vec::new();
    for name in columns {
        let values = DataProcessor::column_values(df, name)?;
        entries.extend(values.iter().enumerate().filter_map(|(row, v)| {
            let value = (*v)?;
            (value < 0.0).then(|| FlagEntry {
                row,
                column: name.clone(),
                value,
                reason: FlagReason::Negative,
            })
        }));
    }

    log::debug!("Negative check flagged {} values for {}", entries.len(), site);
    Ok(FlagTable::build(df, site, entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_counts_include_clean_columns() {
        let df = df! {
            "Timestamp" => [Some("t0"), None, Some("t2"), Some("t3")],
            "GHI" => [Some(1.0f64), None, Some(f64::NAN), Some(3.0)],
            "Tamb" => [20.0f64, 21.0, 22.0, 23.0],
        }
        .unwrap();

        let report = check_missing_values(&df, "Benin").unwrap();

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.columns.len(), 3);
        assert_eq!(report.column("Timestamp").unwrap().count, 1);
        assert_eq!(report.column("GHI").unwrap().count, 2);
        assert_eq!(report.column("GHI").unwrap().percentage, 50.0);
        assert_eq!(report.column("Tamb").unwrap().count, 0);
        assert_eq!(report.column("Tamb").unwrap().percentage, 0.0);
        assert!(report
            .columns
            .iter()
            .all(|c| (0.0..=100.0).contains(&c.percentage)));
    }

    #[test]
    fn test_missing_percentage_is_rounded() {
        let df = df! { "RH" => [Some(1.0f64), None, Some(2.0)] }.unwrap();
        let report = check_missing_values(&df, "Benin").unwrap();
        assert_eq!(report.column("RH").unwrap().percentage, 33.33);
    }

    #[test]
    fn test_outlier_flags_only_extreme_irradiance() {
        let df = df! { "GHI" => [10.0f64, 12.0, 999.0, 11.0] }.unwrap();

        let flags = check_outliers(&df, "Benin", None).unwrap();

        assert_eq!(flags.rows(), vec![2]);
        assert_eq!(flags.entries[0].column, "GHI");
        assert_eq!(flags.entries[0].value, 999.0);
        assert_eq!(flags.frame.height(), 1);
    }

    #[test]
    fn test_constant_column_flags_nothing() {
        let df = df! {
            "WS" => [3.0f64; 6],
            "Cleaning" => [0i64, 0, 0, 0, 0, 0],
        }
        .unwrap();

        let flags = check_outliers(&df, "Benin", None).unwrap();
        assert!(flags.is_empty());
        assert_eq!(flags.frame.height(), 0);
    }

    #[test]
    fn test_zero_iqr_with_spread_tail_flags_nothing() {
        // Q1 == Q3 == 1 even though the last reading is far away.
        let df = df! { "WS" => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0, 100.0] }.unwrap();

        let flags = check_outliers(&df, "Benin", None).unwrap();
        assert!(flags.is_empty());
        assert_eq!(flags.frame.height(), 0);
    }

    #[test]
    fn test_outlier_entries_ordered_by_row() {
        let df = df! {
            "GHI" => [10.0f64, 11.0, 12.0, 11.0, 500.0, 10.0, 12.0, 11.0],
            "WS" => [-90.0f64, 2.0, 2.5, 2.2, 2.1, 2.4, 2.3, 2.0],
        }
        .unwrap();

        let flags = check_outliers(&df, "Benin", None).unwrap();
        let pairs: Vec<(usize, &str)> = flags
            .entries
            .iter()
            .map(|e| (e.row, e.column.as_str()))
            .collect();
        assert_eq!(pairs, vec![(0, "WS"), (4, "GHI")]);
    }

    #[test]
    fn test_outlier_listed_column_must_exist() {
        let df = df! { "GHI" => [1.0f64, 2.0] }.unwrap();
        let err = check_outliers(&df, "Benin", Some(&names(&["DNI"]))).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(c) if c == "DNI"));
    }

    #[test]
    fn test_negative_check_flags_single_row() {
        let df = df! {
            "GHI" => [-5.0f64, 0.0, 3.0, 10.0],
            "Tamb" => [-2.0f64, -1.0, 0.0, 1.0],
        }
        .unwrap();

        let flags = check_negative_values(&df, "Benin", &names(&["GHI"])).unwrap();

        assert_eq!(flags.len(), 1);
        assert_eq!(flags.entries[0].row, 0);
        assert_eq!(flags.entries[0].value, -5.0);
        assert_eq!(flags.entries[0].reason, FlagReason::Negative);
    }

    #[test]
    fn test_negative_check_requires_columns() {
        let df = df! { "GHI" => [1.0f64] }.unwrap();
        let err = check_negative_values(&df, "Benin", &names(&["GHI", "WS"])).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(c) if c == "WS"));
    }

    #[test]
    fn test_flag_frame_carries_source_columns() {
        let df = df! {
            "Timestamp" => ["t0", "t1", "t2"],
            "DNI" => [5.0f64, -1.0, -3.0],
        }
        .unwrap();

        let flags = check_negative_values(&df, "Benin", &names(&["DNI"])).unwrap();

        assert_eq!(
            DataProcessor::column_labels(&flags.frame, "Timestamp").unwrap(),
            vec!["t1", "t2"]
        );
        assert_eq!(
            DataProcessor::present_values(&flags.frame, "row_index").unwrap(),
            vec![1.0, 2.0]
        );
    }

    #[test]
    fn test_source_columns_clashing_with_annotations_are_prefixed() {
        let df = df! {
            "reason" => ["storm", "calm", "calm"],
            "row_index" => [7i64, 8, 9],
            "GHI" => [4.0f64, -2.0, 1.0],
        }
        .unwrap();

        let flags = check_negative_values(&df, "Benin", &names(&["GHI"])).unwrap();

        assert_eq!(flags.len(), 1);
        assert_eq!(
            DataProcessor::column_labels(&flags.frame, "reason").unwrap(),
            vec![FlagReason::Negative.to_string()]
        );
        assert_eq!(
            DataProcessor::column_labels(&flags.frame, "source_reason").unwrap(),
            vec!["calm"]
        );
        assert_eq!(
            DataProcessor::present_values(&flags.frame, "source_row_index").unwrap(),
            vec![8.0]
        );
        assert_eq!(
            DataProcessor::present_values(&flags.frame, "row_index").unwrap(),
            vec![1.0]
        );
    }
}
