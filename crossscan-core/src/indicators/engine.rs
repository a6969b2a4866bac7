//! Indicator engine: fast/slow averages of price and volume per bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sma::{BarField, Sma};
use crate::domain::Bar;
use crate::params::ScanParams;

/// Averages for one bar whose slow window is fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    /// Index of the bar in its series.
    pub index: usize,
    pub date: NaiveDate,
    pub fast_price_ma: f64,
    pub slow_price_ma: f64,
    pub fast_vol_ma: f64,
    pub slow_vol_ma: f64,
}

impl IndicatorPoint {
    pub fn price_fast_above(&self) -> bool {
        self.fast_price_ma > self.slow_price_ma
    }

    pub fn volume_fast_above(&self) -> bool {
        self.fast_vol_ma > self.slow_vol_ma
    }
}

/// Indicator points aligned with bars `first_index..`.
///
/// Bars before `first_index` have no indicator values and never take part in
/// any scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries {
    first_index: usize,
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Build from points that start at bar `first_index` and run contiguously.
    pub fn new(first_index: usize, points: Vec<IndicatorPoint>) -> Self {
        debug_assert!(points
            .iter()
            .enumerate()
            .all(|(offset, p)| p.index == first_index + offset));
        Self {
            first_index,
            points,
        }
    }

    pub fn first_index(&self) -> usize {
        self.first_index
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indicator point for bar `bar_index`, if that bar has one.
    pub fn at(&self, bar_index: usize) -> Option<&IndicatorPoint> {
        bar_index
            .checked_sub(self.first_index)
            .and_then(|offset| self.points.get(offset))
    }
}

/// Computes the four averages the scan needs.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    fast_price: Sma,
    slow_price: Sma,
    fast_vol: Sma,
    slow_vol: Sma,
}

impl IndicatorEngine {
    pub fn new(fast_window: usize, slow_window: usize) -> Self {
        assert!(
            slow_window > fast_window,
            "slow_window must be > fast_window"
        );
        Self {
            fast_price: Sma::new(fast_window, BarField::Close),
            slow_price: Sma::new(slow_window, BarField::Close),
            fast_vol: Sma::new(fast_window, BarField::Volume),
            slow_vol: Sma::new(slow_window, BarField::Volume),
        }
    }

    pub fn from_params(params: &ScanParams) -> Self {
        Self::new(params.fast_window, params.slow_window)
    }

    /// Bars needed before the first point exists.
    pub fn warmup_bars(&self) -> usize {
        self.slow_price.period()
    }

    /// One point per bar from index `slow - 1` on; empty when the series is
    /// shorter than the slow window.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorSeries {
        let first_index = self.slow_price.lookback();
        if bars.len() < self.warmup_bars() {
            return IndicatorSeries::new(first_index, Vec::new());
        }

        let fast_price = self.fast_price.compute(bars);
        let slow_price = self.slow_price.compute(bars);
        let fast_vol = self.fast_vol.compute(bars);
        let slow_vol = self.slow_vol.compute(bars);

        let points = (first_index..bars.len())
            .map(|i| IndicatorPoint {
                index: i,
                date: bars[i].date,
                fast_price_ma: fast_price[i],
                slow_price_ma: slow_price[i],
                fast_vol_ma: fast_vol[i],
                slow_vol_ma: slow_vol[i],
            })
            .collect();

        IndicatorSeries::new(first_index, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn short_series_yields_no_points() {
        let engine = IndicatorEngine::new(20, 200);
        let bars = make_bars(&vec![10.0; 199]);
        assert!(engine.compute(&bars).is_empty());
    }

    #[test]
    fn first_point_sits_at_slow_minus_one() {
        let engine = IndicatorEngine::new(20, 200);
        let bars = make_bars(&vec![10.0; 200]);
        let indicators = engine.compute(&bars);
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators.first_index(), 199);
        assert_eq!(indicators.points()[0].index, 199);
        assert_eq!(indicators.points()[0].date, bars[199].date);
    }

    #[test]
    fn points_cover_the_tail_one_to_one() {
        let engine = IndicatorEngine::new(2, 4);
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let indicators = engine.compute(&bars);
        assert_eq!(indicators.len(), 3);

        let p = indicators.at(5).unwrap();
        assert_eq!(p.fast_price_ma, 5.5);
        assert_eq!(p.slow_price_ma, 4.5);
        assert_eq!(p.fast_vol_ma, 1000.0);
        assert_eq!(p.slow_vol_ma, 1000.0);
        assert!(p.price_fast_above());
        assert!(!p.volume_fast_above());
    }

    #[test]
    fn bars_before_warmup_have_no_point() {
        let engine = IndicatorEngine::new(2, 4);
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let indicators = engine.compute(&bars);
        assert!(indicators.at(2).is_none());
        assert!(indicators.at(3).is_some());
        assert!(indicators.at(5).is_none());
    }
}
