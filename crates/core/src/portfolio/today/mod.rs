//! Today's portfolio change against the previous session close.

pub mod today_calculator;


pub use today_calculator::{fallback_performance, TodayPerformance, TodayPerformanceCalculator};
