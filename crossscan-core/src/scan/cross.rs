//! Golden cross detection over the indicator table.
//!
//! A golden cross on a pair of adjacent points `(prev, curr)` means the fast
//! average sat at or below the slow one on `prev` and strictly above it on
//! `curr`. The scan qualifies a bar only when price and volume both cross on
//! that same pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorPoint, IndicatorSeries};

/// Bar on which a cross completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cross {
    pub index: usize,
    pub date: NaiveDate,
}

impl From<&IndicatorPoint> for Cross {
    fn from(point: &IndicatorPoint) -> Self {
        Self {
            index: point.index,
            date: point.date,
        }
    }
}

pub fn price_crossed(prev: &IndicatorPoint, curr: &IndicatorPoint) -> bool {
    prev.fast_price_ma <= prev.slow_price_ma && curr.fast_price_ma > curr.slow_price_ma
}

pub fn volume_crossed(prev: &IndicatorPoint, curr: &IndicatorPoint) -> bool {
    prev.fast_vol_ma <= prev.slow_vol_ma && curr.fast_vol_ma > curr.slow_vol_ma
}

/// Finds the most recent cross, walking backward from the last point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossDetector {
    lookback: Option<usize>,
}

impl CrossDetector {
    /// `lookback` limits the cross to the last N bars of the series.
    pub fn new(lookback: Option<usize>) -> Self {
        Self { lookback }
    }

    /// Most recent bar where price and volume cross together.
    pub fn latest(&self, indicators: &IndicatorSeries, series_len: usize) -> Option<Cross> {
        self.latest_where(indicators, series_len, |prev, curr| {
            price_crossed(prev, curr) && volume_crossed(prev, curr)
        })
    }

    /// Most recent price-only cross, regardless of volume.
    pub fn latest_price_cross(
        &self,
        indicators: &IndicatorSeries,
        series_len: usize,
    ) -> Option<Cross> {
        self.latest_where(indicators, series_len, price_crossed)
    }

    /// Most recent volume-only cross, regardless of price.
    pub fn latest_volume_cross(
        &self,
        indicators: &IndicatorSeries,
        series_len: usize,
    ) -> Option<Cross> {
        self.latest_where(indicators, series_len, volume_crossed)
    }

    fn latest_where<F>(
        &self,
        indicators: &IndicatorSeries,
        series_len: usize,
        crossed: F,
    ) -> Option<Cross>
    where
        F: Fn(&IndicatorPoint, &IndicatorPoint) -> bool,
    {
        let earliest = self
            .lookback
            .map_or(0, |bars| series_len.saturating_sub(bars));

        indicators
            .points()
            .windows(2)
            .rev()
            .take_while(|pair| pair[1].index >= earliest)
            .find(|pair| crossed(&pair[0], &pair[1]))
            .map(|pair| Cross::from(&pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(
        index: usize,
        fast_price: f64,
        slow_price: f64,
        fast_vol: f64,
        slow_vol: f64,
    ) -> IndicatorPoint {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        IndicatorPoint {
            index,
            date: start + chrono::Duration::days(index as i64),
            fast_price_ma: fast_price,
            slow_price_ma: slow_price,
            fast_vol_ma: fast_vol,
            slow_vol_ma: slow_vol,
        }
    }

    fn series(points: Vec<IndicatorPoint>) -> IndicatorSeries {
        let first = points[0].index;
        IndicatorSeries::new(first, points)
    }

    #[test]
    fn co_occurring_cross_is_found() {
        let ind = series(vec![
            point(10, 9.0, 10.0, 90.0, 100.0),
            point(11, 11.0, 10.0, 110.0, 100.0),
            point(12, 12.0, 10.0, 120.0, 100.0),
        ]);
        let cross = CrossDetector::default().latest(&ind, 13).unwrap();
        assert_eq!(cross.index, 11);
    }

    #[test]
    fn equal_averages_count_as_below() {
        let ind = series(vec![
            point(10, 10.0, 10.0, 100.0, 100.0),
            point(11, 10.5, 10.0, 101.0, 100.0),
        ]);
        assert_eq!(CrossDetector::default().latest(&ind, 12).unwrap().index, 11);
    }

    #[test]
    fn equal_on_current_bar_is_not_a_cross() {
        let ind = series(vec![
            point(10, 9.0, 10.0, 90.0, 100.0),
            point(11, 10.0, 10.0, 110.0, 100.0),
        ]);
        assert!(CrossDetector::default().latest(&ind, 12).is_none());
    }

    #[test]
    fn crosses_on_different_bars_do_not_qualify() {
        let ind = series(vec![
            point(10, 9.0, 10.0, 90.0, 100.0),
            point(11, 11.0, 10.0, 95.0, 100.0),
            point(12, 12.0, 10.0, 105.0, 100.0),
        ]);
        let detector = CrossDetector::default();
        assert!(detector.latest(&ind, 13).is_none());
        assert_eq!(detector.latest_price_cross(&ind, 13).unwrap().index, 11);
        assert_eq!(detector.latest_volume_cross(&ind, 13).unwrap().index, 12);
    }

    #[test]
    fn most_recent_cross_wins() {
        let ind = series(vec![
            point(10, 9.0, 10.0, 90.0, 100.0),
            point(11, 11.0, 10.0, 110.0, 100.0),
            point(12, 9.0, 10.0, 90.0, 100.0),
            point(13, 11.0, 10.0, 110.0, 100.0),
            point(14, 12.0, 10.0, 120.0, 100.0),
        ]);
        assert_eq!(CrossDetector::default().latest(&ind, 15).unwrap().index, 13);
    }

    #[test]
    fn lookback_excludes_older_crosses() {
        let ind = series(vec![
            point(10, 9.0, 10.0, 90.0, 100.0),
            point(11, 11.0, 10.0, 110.0, 100.0),
            point(12, 12.0, 10.0, 120.0, 100.0),
            point(13, 12.0, 10.0, 120.0, 100.0),
            point(14, 12.0, 10.0, 120.0, 100.0),
        ]);
        // Series of 15 bars, lookback 4 keeps bars 11..=14.
        assert_eq!(CrossDetector::new(Some(4)).latest(&ind, 15).unwrap().index, 11);
        assert!(CrossDetector::new(Some(3)).latest(&ind, 15).is_none());
    }

    #[test]
    fn single_point_has_no_pair() {
        let ind = series(vec![point(10, 11.0, 10.0, 110.0, 100.0)]);
        assert!(CrossDetector::default().latest(&ind, 11).is_none());
    }
}
