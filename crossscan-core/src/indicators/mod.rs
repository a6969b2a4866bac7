//! Moving averages and the per-bar indicator table.
//!
//! `Sma` is the only smoothing the scan uses. `IndicatorEngine` runs it over
//! close and volume at both windows and keeps the bars where the slow window
//! is fully populated.

pub mod engine;
pub mod sma;

pub use engine::{IndicatorEngine, IndicatorPoint, IndicatorSeries};
pub use sma::{BarField, Sma};

/// Create bars from close prices for testing.
///
/// open = close, high = close + 0.5, low = close - 0.5, volume = 1000, one
/// calendar day apart.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
