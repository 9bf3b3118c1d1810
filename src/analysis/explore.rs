//! Exploratory plots: time series, correlation, wind, temperature, histograms.

use super::{ensure_rows, require_numeric, resolve_numeric_columns, AnalysisError};
use crate::charts::{Chart, Heatmap, Layer, Panel, Series, WindRose};
use crate::config::ColumnSchema;
use crate::data::DataProcessor;
use crate::stats::StatsCalculator;
use polars::prelude::*;
use rayon::prelude::*;

/// Direction sectors of the wind rose.
pub const WIND_SECTORS: usize = 16;

/// Upper edges (m/s) of the wind speed bins; the last bin is open-ended.
pub const WIND_SPEED_EDGES: [f64; 3] = [2.0, 4.0, 6.0];

fn series_by_row(df: &DataFrame, name: &str) -> Result<Series, AnalysisError> {
    require_numeric(df, name)?;
    let points = DataProcessor::column_values(df, name)?
        .into_iter()
        .enumerate()
        .filter_map(|(row, v)| Some([row as f64, v?]))
        .collect();
    Ok(Series {
        name: name.to_string(),
        points,
    })
}

/// `y` against `x` over the rows where both are present.
fn paired_series(df: &DataFrame, x: &str, y: &str) -> Result<Series, AnalysisError> {
    require_numeric(df, x)?;
    require_numeric(df, y)?;
    let xs = DataProcessor::column_values(df, x)?;
    let ys = DataProcessor::column_values(df, y)?;
    let points = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([x?, y?]))
        .collect();
    Ok(Series {
        name: format!("{y} vs {x}"),
        points,
    })
}

fn timestamp_ticks(
    df: &DataFrame,
    schema: &ColumnSchema,
) -> Result<Option<Vec<String>>, AnalysisError> {
    if df.column(&schema.timestamp).is_err() {
        return Ok(None);
    }
    Ok(Some(DataProcessor::column_labels(df, &schema.timestamp)?))
}

/// Irradiance components and ambient temperature over time.
pub fn time_series(df: &DataFrame, schema: &ColumnSchema) -> Result<Chart, AnalysisError> {
    ensure_rows(df)?;
    let mut names = schema.irradiance.clone();
    names.push(schema.ambient_temperature.clone());

    let series = names
        .iter()
        .map(|name| series_by_row(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut panel = Panel::new("Irradiance and temperature over time", Layer::Lines(series))
        .with_axes(&schema.timestamp, "Value");
    if let Some(ticks) = timestamp_ticks(df, schema)? {
        panel = panel.with_x_ticks(ticks);
    }

    Ok(Chart::new("Time Series Plot", vec![panel]))
}

/// Filled areas of the irradiance components over time.
pub fn area_plot(df: &DataFrame, schema: &ColumnSchema) -> Result<Chart, AnalysisError> {
    ensure_rows(df)?;
    let series = schema
        .irradiance
        .iter()
        .map(|name| series_by_row(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut panel = Panel::new("Solar irradiance components", Layer::Areas(series))
        .with_axes(&schema.timestamp, "Irradiance (W/m²)");
    if let Some(ticks) = timestamp_ticks(df, schema)? {
        panel = panel.with_x_ticks(ticks);
    }

    Ok(Chart::new("Area Plot", vec![panel]))
}

/// Pearson correlation matrix of the selected (or all numeric) columns.
pub fn correlation_matrix(
    df: &DataFrame,
    columns: Option<&[String]>,
) -> Result<Heatmap, AnalysisError> {
    ensure_rows(df)?;
    let labels = resolve_numeric_columns(df, columns)?;
    let values = labels
        .iter()
        .map(|name| DataProcessor::column_values(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let matrix: Vec<Vec<f64>> = (0..labels.len())
        .into_par_iter()
        .map(|i| {
            (0..labels.len())
                .map(|j| {
                    let r = StatsCalculator::pearson(&values[i], &values[j]);
                    // Self-correlation is exactly 1 unless the column has no spread.
                    if i == j && !r.is_nan() {
                        1.0
                    } else {
                        r
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    Ok(Heatmap {
        labels,
        values: matrix,
    })
}

pub fn correlation_analysis(
    df: &DataFrame,
    columns: Option<&[String]>,
) -> Result<Chart, AnalysisError> {
    let heatmap = correlation_matrix(df, columns)?;
    Ok(Chart::new(
        "Correlation Analysis",
        vec![Panel::new("Pearson correlation", Layer::Heatmap(heatmap))],
    ))
}

/// Sector index of a direction in degrees, sector 0 centred on north.
pub fn direction_sector(degrees: f64) -> usize {
    let width = 360.0 / WIND_SECTORS as f64;
    let shifted = (degrees + width / 2.0).rem_euclid(360.0);
    ((shifted / width).floor() as usize).min(WIND_SECTORS - 1)
}

fn speed_bin(speed: f64) -> usize {
    WIND_SPEED_EDGES
        .iter()
        .position(|&edge| speed < edge)
        .unwrap_or(WIND_SPEED_EDGES.len())
}

fn speed_bin_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(WIND_SPEED_EDGES.len() + 1);
    let mut lower = 0.0;
    for edge in WIND_SPEED_EDGES {
        labels.push(format!("{lower}-{edge} m/s"));
        lower = edge;
    }
    labels.push(format!(">= {lower} m/s"));
    labels
}

/// Wind rose of speed by direction sector.
pub fn wind_analysis(df: &DataFrame, speed: &str, direction: &str) -> Result<Chart, AnalysisError> {
    ensure_rows(df)?;
    require_numeric(df, speed)?;
    require_numeric(df, direction)?;

    let speeds = DataProcessor::column_values(df, speed)?;
    let directions = DataProcessor::column_values(df, direction)?;

    let mut counts = vec![vec![0usize; WIND_SPEED_EDGES.len() + 1]; WIND_SECTORS];
    for (s, d) in speeds.into_iter().zip(directions) {
        if let (Some(s), Some(d)) = (s, d) {
            counts[direction_sector(d)][speed_bin(s)] += 1;
        }
    }

    let rose = WindRose {
        sector_width: 360.0 / WIND_SECTORS as f64,
        speed_bins: speed_bin_labels(),
        counts,
    };

    Ok(Chart::new(
        "Wind Speed and Direction Analysis",
        vec![Panel::new(format!("Wind rose ({speed} by {direction})"), Layer::WindRose(rose))],
    ))
}

/// Temperature against humidity and against irradiance.
pub fn temperature_analysis(df: &DataFrame, schema: &ColumnSchema) -> Result<Chart, AnalysisError> {
    ensure_rows(df)?;

    let mut panels = vec![Panel::new(
        "Ambient temperature vs relative humidity",
        Layer::Scatter(vec![paired_series(df, &schema.humidity, &schema.ambient_temperature)?]),
    )
    .with_axes(&schema.humidity, &schema.ambient_temperature)];

    if let Some(ghi) = schema.irradiance.first() {
        let mut series = vec![paired_series(df, ghi, &schema.ambient_temperature)?];
        for module in &schema.module_temperatures {
            series.push(paired_series(df, ghi, module)?);
        }
        panels.push(
            Panel::new("Temperature vs global irradiance", Layer::Scatter(series))
                .with_axes(ghi, "Temperature (°C)"),
        );
    }

    Ok(Chart::new("Temperature Analysis", panels))
}

/// One distribution panel per selected (or numeric) column.
pub fn histograms(
    df: &DataFrame,
    columns: Option<&[String]>,
    bins: usize,
) -> Result<Chart, AnalysisError> {
    ensure_rows(df)?;
    let columns = resolve_numeric_columns(df, columns)?;

    let panels = columns
        .iter()
        .map(|name| {
            let values = DataProcessor::present_values(df, name)?;
            Ok(Panel::new(
                format!("Distribution of {name}"),
                Layer::Histogram(StatsCalculator::histogram(&values, bins)),
            )
            .with_axes(name, "Frequency"))
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(Chart::new("Histograms", panels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ColumnSchema {
        ColumnSchema {
            irradiance: vec!["GHI".to_string(), "DNI".to_string()],
            module_temperatures: vec!["TModA".to_string()],
            ..ColumnSchema::default()
        }
    }

    fn site_table() -> DataFrame {
        df! {
            "Timestamp" => ["t0", "t1", "t2", "t3", "t4"],
            "GHI" => [Some(0.0f64), Some(200.0), None, Some(600.0), Some(800.0)],
            "DNI" => [0.0f64, 150.0, 300.0, 450.0, 600.0],
            "Tamb" => [22.0f64, 24.0, 26.0, 28.0, 30.0],
            "TModA" => [21.0f64, 27.0, 33.0, 39.0, 45.0],
            "RH" => [90.0f64, 80.0, 70.0, 60.0, 50.0],
            "WS" => [0.5f64, 3.0, 5.0, 7.0, 1.0],
            "WD" => [0.0f64, 359.0, 90.0, 180.0, 270.0],
        }
        .unwrap()
    }

    #[test]
    fn test_time_series_skips_missing_points() {
        let chart = time_series(&site_table(), &schema()).unwrap();
        let panel = &chart.panels[0];

        let Layer::Lines(series) = &panel.layer else {
            panic!("expected lines");
        };
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].points.len(), 4);
        assert_eq!(series[0].points[2], [3.0, 600.0]);
        assert_eq!(panel.x_ticks.as_ref().map(|t| t.len()), Some(5));
    }

    #[test]
    fn test_area_plot_missing_column() {
        let df = df! { "GHI" => [1.0f64] }.unwrap();
        assert!(matches!(
            area_plot(&df, &schema()),
            Err(AnalysisError::MissingColumn(c)) if c == "DNI"
        ));
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let columns = vec!["DNI".to_string(), "Tamb".to_string(), "RH".to_string()];
        let heatmap = correlation_matrix(&site_table(), Some(&columns)).unwrap();

        for i in 0..3 {
            assert_eq!(heatmap.values[i][i], 1.0);
            for j in 0..3 {
                assert!((heatmap.values[i][j] - heatmap.values[j][i]).abs() < 1e-12);
            }
        }
        assert!((heatmap.values[0][2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_correlates_as_nan() {
        let df = df! {
            "GHI" => [1.0f64, 2.0, 3.0, 4.0],
            "WSstdev" => [3.0f64, 3.0, 3.0, 3.0],
        }
        .unwrap();

        let heatmap = correlation_matrix(&df, None).unwrap();

        assert_eq!(heatmap.values[0][0], 1.0);
        assert!(heatmap.values[1][1].is_nan());
        assert!(heatmap.values[0][1].is_nan());
        assert!(heatmap.values[1][0].is_nan());
    }

    #[test]
    fn test_north_sector_wraps_around() {
        assert_eq!(direction_sector(0.0), 0);
        assert_eq!(direction_sector(359.0), 0);
        assert_eq!(direction_sector(11.0), 0);
        assert_eq!(direction_sector(12.0), 1);
        assert_eq!(direction_sector(90.0), 4);
        assert_eq!(direction_sector(-90.0), 12);
    }

    #[test]
    fn test_wind_rose_counts_every_pair() {
        let chart = wind_analysis(&site_table(), "WS", "WD").unwrap();
        let Layer::WindRose(rose) = &chart.panels[0].layer else {
            panic!("expected wind rose");
        };

        assert_eq!(rose.total(), 5);
        assert_eq!(rose.counts[0], vec![1, 1, 0, 0]);
        assert_eq!(rose.counts[4], vec![0, 0, 1, 0]);
        assert_eq!(rose.counts[8], vec![0, 0, 0, 1]);
        assert_eq!(rose.speed_bins.len(), 4);
    }

    #[test]
    fn test_temperature_panels() {
        let chart = temperature_analysis(&site_table(), &schema()).unwrap();
        assert_eq!(chart.panels.len(), 2);

        let Layer::Scatter(series) = &chart.panels[1].layer else {
            panic!("expected scatter");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].name, "TModA vs GHI");
        assert_eq!(series[1].points.len(), 4);
    }

    #[test]
    fn test_histogram_per_numeric_column() {
        let chart = histograms(&site_table(), None, 4).unwrap();
        assert_eq!(chart.panels.len(), 7);

        let Layer::Histogram(bins) = &chart.panels[0].layer else {
            panic!("expected histogram");
        };
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }
}
