//! Data module - CSV loading, caching and column access

mod cache;
mod loader;
mod processor;

pub use cache::{CacheKey, TableCache};
pub use loader::{DataLoader, LoaderError};
pub use processor::DataProcessor;
