//! Analysis module - data quality and descriptive analysis of a site table
//!
//! Every function takes the observation table by reference, never mutates it,
//! and returns a freshly built result.

pub mod cleaning;
pub mod explore;
pub mod quality;
pub mod summary;

use crate::data::DataProcessor;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Dataset has no rows to analyze")]
    EmptyDataset,
    #[error("Expected column '{0}' is missing from the table")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

pub(crate) fn ensure_rows(df: &DataFrame) -> Result<(), AnalysisError> {
    if df.height() == 0 {
        return Err(AnalysisError::EmptyDataset);
    }
    Ok(())
}

/// Check that a required column exists and is numeric.
pub(crate) fn require_numeric(df: &DataFrame, name: &str) -> Result<(), AnalysisError> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::MissingColumn(name.to_string()))?;
    if !DataProcessor::is_numeric(column.dtype()) {
        return Err(AnalysisError::NonNumericColumn(name.to_string()));
    }
    Ok(())
}

/// Requested columns, or every numeric column when none are given.
pub(crate) fn resolve_numeric_columns(
    df: &DataFrame,
    columns: Option<&[String]>,
) -> Result<Vec<String>, AnalysisError> {
    match columns {
        Some(columns) => {
            for name in columns {
                require_numeric(df, name)?;
            }
            Ok(columns.to_vec())
        }
        None => Ok(DataProcessor::numeric_columns(df)),
    }
}
