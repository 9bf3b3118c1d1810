//! Dashboard menu: one entry per analysis, dispatched against the loaded table.

use crate::analysis::cleaning::{self, CleaningImpact};
use crate::analysis::quality::{self, FlagTable, MissingReport};
use crate::analysis::summary::{self, SummaryResult};
use crate::analysis::{explore, AnalysisError};
use crate::charts::Chart;
use crate::config::DashboardConfig;
use polars::prelude::*;

/// Sidebar entries, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Analysis {
    #[default]
    SummaryStatistics,
    MissingValues,
    Outliers,
    NegativeValues,
    TimeSeries,
    AreaPlot,
    CleaningImpact,
    Correlation,
    Wind,
    Temperature,
    Histograms,
}

impl Analysis {
    pub const ALL: [Analysis; 11] = [
        Analysis::SummaryStatistics,
        Analysis::MissingValues,
        Analysis::Outliers,
        Analysis::NegativeValues,
        Analysis::TimeSeries,
        Analysis::AreaPlot,
        Analysis::CleaningImpact,
        Analysis::Correlation,
        Analysis::Wind,
        Analysis::Temperature,
        Analysis::Histograms,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Analysis::SummaryStatistics => "Summary Statistics",
            Analysis::MissingValues => "Missing Values",
            Analysis::Outliers => "Outliers",
            Analysis::NegativeValues => "Negative Values",
            Analysis::TimeSeries => "Time Series Plot",
            Analysis::AreaPlot => "Area Plot",
            Analysis::CleaningImpact => "Impact of Cleaning",
            Analysis::Correlation => "Correlation Analysis",
            Analysis::Wind => "Wind Analysis",
            Analysis::Temperature => "Temperature Analysis",
            Analysis::Histograms => "Histograms",
        }
    }
}

/// What a menu entry produced.
#[derive(Debug, Clone)]
pub enum AnalysisOutput {
    Summary(SummaryResult),
    Missing(MissingReport),
    Flags(FlagTable),
    Cleaning { impact: CleaningImpact, chart: Chart },
    Chart(Chart),
}

impl AnalysisOutput {
    /// Chart that can be exported as an image, if any.
    pub fn chart(&self) -> Option<&Chart> {
        match self {
            AnalysisOutput::Cleaning { chart, .. } | AnalysisOutput::Chart(chart) => Some(chart),
            _ => None,
        }
    }
}

/// Run one menu entry against the table.
pub fn run(
    analysis: Analysis,
    df: &DataFrame,
    config: &DashboardConfig,
) -> Result<AnalysisOutput, AnalysisError> {
    let site = config.site_label.as_str();
    let schema = &config.columns;
    log::debug!("Running '{}' on {} rows", analysis.label(), df.height());

    let output = match analysis {
        Analysis::SummaryStatistics => {
            AnalysisOutput::Summary(summary::summary_statistics(df, site)?)
        }
        Analysis::MissingValues => {
            AnalysisOutput::Missing(quality::check_missing_values(df, site)?)
        }
        Analysis::Outliers => AnalysisOutput::Flags(quality::check_outliers(df, site, None)?),
        Analysis::NegativeValues => AnalysisOutput::Flags(quality::check_negative_values(
            df,
            site,
            &schema.non_negative,
        )?),
        Analysis::TimeSeries => AnalysisOutput::Chart(explore::time_series(df, schema)?),
        Analysis::AreaPlot => AnalysisOutput::Chart(explore::area_plot(df, schema)?),
        Analysis::CleaningImpact => {
            let impact = cleaning::evaluate_cleaning_impact(df, site, &schema.cleaning)?;
            let chart = cleaning::cleaning_impact_chart(&impact, &schema.module_irradiance);
            AnalysisOutput::Cleaning { impact, chart }
        }
        Analysis::Correlation => AnalysisOutput::Chart(explore::correlation_analysis(
            df,
            Some(&schema.correlation_columns()),
        )?),
        Analysis::Wind => AnalysisOutput::Chart(explore::wind_analysis(
            df,
            &schema.wind_speed,
            &schema.wind_direction,
        )?),
        Analysis::Temperature => AnalysisOutput::Chart(explore::temperature_analysis(df, schema)?),
        Analysis::Histograms => {
            AnalysisOutput::Chart(explore::histograms(df, None, config.histogram_bins)?)
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_table() -> DataFrame {
        df! {
            "Timestamp" => [
                "2021-08-09 00:01",
                "2021-08-09 00:02",
                "2021-08-09 00:03",
                "2021-08-09 00:04",
            ],
            "GHI" => [-1.2f64, 0.0, 10.5, 250.0],
            "DNI" => [0.0f64, 0.0, 5.0, 120.0],
            "DHI" => [0.0f64, 0.1, 4.0, 90.0],
            "ModA" => [0.0f64, 0.0, 9.0, 240.0],
            "ModB" => [0.0f64, 0.0, 8.5, 235.0],
            "Tamb" => [26.2f64, 26.1, 26.5, 29.0],
            "RH" => [93.4f64, 93.6, 92.0, 80.1],
            "WS" => [0.0f64, 1.1, 3.0, 6.5],
            "WSgust" => [0.4f64, 1.6, 3.8, 7.2],
            "WD" => [0.0f64, 122.1, 359.0, 180.0],
            "TModA" => [26.3f64, 26.2, 27.0, 40.1],
            "TModB" => [26.7f64, 26.6, 27.1, 38.9],
            "Cleaning" => [0i64, 0, 1, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_every_menu_entry_runs() {
        let df = site_table();
        let config = DashboardConfig::default();

        for analysis in Analysis::ALL {
            let output = run(analysis, &df, &config)
                .unwrap_or_else(|e| panic!("{} failed: {}", analysis.label(), e));
            let matches = match analysis {
                Analysis::SummaryStatistics => matches!(output, AnalysisOutput::Summary(_)),
                Analysis::MissingValues => matches!(output, AnalysisOutput::Missing(_)),
                Analysis::Outliers | Analysis::NegativeValues => {
                    matches!(output, AnalysisOutput::Flags(_))
                }
                Analysis::CleaningImpact => matches!(output, AnalysisOutput::Cleaning { .. }),
                _ => matches!(output, AnalysisOutput::Chart(_)),
            };
            assert!(matches, "unexpected output for {}", analysis.label());
        }
    }

    #[test]
    fn test_negative_values_use_configured_columns() {
        let df = site_table();
        let output = run(Analysis::NegativeValues, &df, &DashboardConfig::default()).unwrap();
        let AnalysisOutput::Flags(flags) = output else {
            panic!("expected flags");
        };
        assert_eq!(flags.rows(), vec![0]);
    }

    #[test]
    fn test_empty_table_is_reported() {
        let df = site_table().head(Some(0));
        assert!(matches!(
            run(Analysis::SummaryStatistics, &df, &DashboardConfig::default()),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn test_menu_order_and_labels() {
        assert_eq!(Analysis::ALL.len(), 11);
        assert_eq!(Analysis::ALL[0].label(), "Summary Statistics");
        assert_eq!(Analysis::ALL[6].label(), "Impact of Cleaning");
        assert_eq!(Analysis::ALL[10].label(), "Histograms");
    }
}
