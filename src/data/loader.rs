//! CSV Data Loader Module
//! Reads the site CSV with Polars, keeping only the leading rows.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, truncated to the first `row_cap` rows when a cap is set.
    ///
    /// Row order is the order of the file.
    pub fn load_csv(file_path: &Path, row_cap: Option<usize>) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .with_n_rows(row_cap)
            .finish()?
            .collect()?;

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );

        Ok(df)
    }

    /// Get list of column names.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(df: &DataFrame) -> usize {
        df.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = DataLoader::load_csv(Path::new("./no/such/site.csv"), Some(10)).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }
}
