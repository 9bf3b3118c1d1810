//! Dashboard Configuration Module
//! Data source, row cap, site label and the column schema of the site dataset.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of leading rows kept from the source file.
pub const DEFAULT_ROW_CAP: usize = 1000;

/// Default number of bins per histogram panel.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Column names of the site dataset.
///
/// Defaults match the Benin-Malanville export; every field can be overridden
/// from the JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    pub timestamp: String,
    /// Global / direct / diffuse horizontal irradiance.
    pub irradiance: Vec<String>,
    /// Irradiance measured on the sensor modules.
    pub module_irradiance: Vec<String>,
    pub ambient_temperature: String,
    pub module_temperatures: Vec<String>,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_gust: String,
    pub wind_direction: String,
    pub cleaning: String,
    /// Columns that can never legitimately hold negative readings.
    pub non_negative: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            timestamp: "Timestamp".to_string(),
            irradiance: strings(&["GHI", "DNI", "DHI"]),
            module_irradiance: strings(&["ModA", "ModB"]),
            ambient_temperature: "Tamb".to_string(),
            module_temperatures: strings(&["TModA", "TModB"]),
            humidity: "RH".to_string(),
            wind_speed: "WS".to_string(),
            wind_gust: "WSgust".to_string(),
            wind_direction: "WD".to_string(),
            cleaning: "Cleaning".to_string(),
            non_negative: strings(&["GHI", "DNI", "DHI", "ModA", "ModB", "WS", "WSgust"]),
        }
    }
}

impl ColumnSchema {
    /// Columns shown in the correlation heatmap.
    pub fn correlation_columns(&self) -> Vec<String> {
        let mut columns = self.irradiance.clone();
        columns.extend(self.module_temperatures.iter().cloned());
        columns.push(self.wind_speed.clone());
        columns.push(self.wind_gust.clone());
        columns.push(self.wind_direction.clone());
        columns
    }
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// `None` keeps every row of the file.
    pub row_cap: Option<usize>,
    pub site_label: String,
    pub histogram_bins: usize,
    pub columns: ColumnSchema,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/benin-malanville.csv"),
            row_cap: Some(DEFAULT_ROW_CAP),
            site_label: "Benin".to_string(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            columns: ColumnSchema::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::load(path)?;
                log::info!("Loaded dashboard config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Same config pointed at another data file.
    pub fn with_data_path(&self, data_path: PathBuf) -> Self {
        Self {
            data_path,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_benin_export() {
        let config = DashboardConfig::default();
        assert_eq!(config.row_cap, Some(1000));
        assert_eq!(config.columns.cleaning, "Cleaning");
        assert!(config.columns.non_negative.contains(&"GHI".to_string()));
        assert!(!config.columns.non_negative.contains(&"Tamb".to_string()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(
            r#"{ "row_cap": null, "site_label": "Togo", "columns": { "wind_speed": "wind" } }"#,
        )
        .unwrap();

        assert_eq!(config.row_cap, None);
        assert_eq!(config.site_label, "Togo");
        assert_eq!(config.columns.wind_speed, "wind");
        assert_eq!(config.columns.wind_direction, "WD");
        assert_eq!(config.histogram_bins, DEFAULT_HISTOGRAM_BINS);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DashboardConfig::load(Path::new("./does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
