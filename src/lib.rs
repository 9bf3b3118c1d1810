//! Solar Dashboard - data quality and descriptive analysis of solar site readings
//!
//! Loads a CSV of irradiance, temperature and wind readings for one site and
//! runs summary statistics, quality checks, the cleaning-impact comparison and
//! a set of exploratory charts over it.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod stats;
