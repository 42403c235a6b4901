//! Performance chart series and per-timeframe metrics.

pub mod performance_model;
pub mod series_generator;

#[cfg(test)]
mod series_generator_tests;

pub use performance_model::{ChartDataPoint, Timeframe, TimeframePerformance};
pub use series_generator::{available_timeframes, generate, timeframe_performance};
