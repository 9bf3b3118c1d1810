//! Data Processor Module
//! Column extraction and row selection helpers shared by the analyses.

use polars::prelude::*;

/// Column access helpers over an observation table.
pub struct DataProcessor;

impl DataProcessor {
    /// Whether a dtype takes part in numeric analyses.
    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Whether a dtype can act as an on/off flag: any numeric type or boolean.
    pub fn is_flag(dtype: &DataType) -> bool {
        Self::is_numeric(dtype) || matches!(dtype, DataType::Boolean)
    }

    /// Whether a dtype can hold NaN.
    pub fn is_float(dtype: &DataType) -> bool {
        matches!(dtype, DataType::Float32 | DataType::Float64)
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| Self::is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Values of a column as `f64`, one entry per row. Null and NaN become `None`.
    pub fn column_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let column = df.column(name)?;
        let as_f64 = column.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;

        Ok(ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Non-missing values of a column.
    pub fn present_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
        Ok(Self::column_values(df, name)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// A column rendered as text, one label per row (empty for nulls).
    pub fn column_labels(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
        let column = df.column(name)?;
        let as_str = column.cast(&DataType::String)?;
        let ca = as_str.str()?;

        Ok(ca
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// New DataFrame holding only the given rows, in the given order.
    pub fn take_rows(df: &DataFrame, rows: &[usize]) -> PolarsResult<DataFrame> {
        let indices: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
        let idx = IdxCa::from_vec("row".into(), indices);
        df.take(&idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_columns_skip_text() {
        let df = df! {
            "Timestamp" => ["2021-08-09 00:01", "2021-08-09 00:02"],
            "GHI" => [1.5f64, 2.0],
            "Cleaning" => [0i64, 1],
        }
        .unwrap();

        assert_eq!(DataProcessor::numeric_columns(&df), vec!["GHI", "Cleaning"]);
    }

    #[test]
    fn test_column_values_treat_nan_as_missing() {
        let df = df! {
            "GHI" => [Some(1.0f64), None, Some(f64::NAN), Some(4.0)],
        }
        .unwrap();

        let values = DataProcessor::column_values(&df, "GHI").unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(4.0)]);
        assert_eq!(DataProcessor::present_values(&df, "GHI").unwrap(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_take_rows_keeps_requested_order() {
        let df = df! {
            "GHI" => [10.0f64, 20.0, 30.0],
        }
        .unwrap();

        let taken = DataProcessor::take_rows(&df, &[2, 0]).unwrap();
        assert_eq!(
            DataProcessor::present_values(&taken, "GHI").unwrap(),
            vec![30.0, 10.0]
        );
    }
}
