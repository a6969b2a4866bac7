//! Pullback to the slow average after a cross.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cross::Cross;
use crate::domain::Bar;
use crate::indicators::IndicatorSeries;

/// First bar in the pullback window that closed at or below its slow average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub slow_price_ma: f64,
}

/// Scans bars `cross + min_offset ..= cross + max_offset`.
#[derive(Debug, Clone, Copy)]
pub struct PullbackScanner {
    min_offset: usize,
    max_offset: usize,
}

impl PullbackScanner {
    pub fn new(min_offset: usize, max_offset: usize) -> Self {
        assert!(
            min_offset >= 1 && min_offset <= max_offset,
            "pullback window must satisfy 1 <= min <= max"
        );
        Self {
            min_offset,
            max_offset,
        }
    }

    /// Earliest touch in the window. Bars past the end of the series are not
    /// scanned, so a window cut short by the data simply finds nothing.
    pub fn scan(&self, bars: &[Bar], indicators: &IndicatorSeries, cross: &Cross) -> Option<Touch> {
        let start = cross.index + self.min_offset;
        let end = (cross.index + self.max_offset).min(bars.len().saturating_sub(1));

        (start..=end).find_map(|i| {
            let point = indicators.at(i)?;
            let bar = &bars[i];
            (bar.close <= point.slow_price_ma).then_some(Touch {
                index: i,
                date: bar.date,
                close: bar.close,
                slow_price_ma: point.slow_price_ma,
            })
        })
    }
}
