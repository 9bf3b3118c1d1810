//! Stats module - Statistical computations

mod calculator;

pub use calculator::{
    DescriptiveStats, HistogramBin, StatsCalculator, TTest, IQR_FENCE_FACTOR,
    SIGNIFICANCE_THRESHOLD,
};
