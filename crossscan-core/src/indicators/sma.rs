//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of one bar field over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::domain::Bar;

/// Bar field an average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    Close,
    Volume,
}

impl BarField {
    fn value(self, bar: &Bar) -> f64 {
        match self {
            BarField::Close => bar.close,
            BarField::Volume => bar.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    field: BarField,
}

impl Sma {
    pub fn new(period: usize, field: BarField) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period, field }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    /// One value per bar; NaN until the window is full.
    ///
    /// Every window is summed on its own with Neumaier compensation, so a
    /// value never depends on bars that have left the window. A window whose
    /// values are all equal averages to exactly that value.
    pub fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for end in self.period - 1..n {
            result[end] = self.window_mean(&bars[end + 1 - self.period..=end]);
        }

        result
    }

    fn window_mean(&self, window: &[Bar]) -> f64 {
        let first = self.field.value(&window[0]);
        if window.iter().all(|bar| self.field.value(bar) == first) {
            return first;
        }

        let mut sum = CompensatedSum::default();
        for bar in window {
            sum.add(self.field.value(bar));
        }
        sum.total() / self.period as f64
    }
}

/// Neumaier's variant of Kahan summation.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(self) -> f64 {
        self.sum + self.compensation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    /// Two-decimal random walk from 1234.56, then `flat_len` bars at `flat`.
    fn decimal_then_flat(seed: u64, walk_len: usize, flat: f64, flat_len: usize) -> Vec<f64> {
        let mut state = seed;
        let mut cents: i64 = 123_456;
        let mut closes = Vec::with_capacity(walk_len + flat_len);
        for _ in 0..walk_len {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            cents += (state >> 33) as i64 % 401 - 200;
            cents = cents.max(100);
            closes.push(cents as f64 / 100.0);
        }
        closes.extend(std::iter::repeat(flat).take(flat_len));
        closes
    }

    #[test]
    fn sma_5_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5, BarField::Close).compute(&bars);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().enumerate().take(4) {
            assert!(value.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1, BarField::Close).compute(&bars);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn volume_average() {
        let mut bars = make_bars(&[1.0, 1.0, 1.0, 1.0]);
        for (bar, volume) in bars.iter_mut().zip([100.0, 200.0, 300.0, 600.5]) {
            bar.volume = volume;
        }
        let result = Sma::new(2, BarField::Volume).compute(&bars);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[150.0, 250.0, 450.25]);
    }

    #[test]
    fn integer_inputs_stay_exact() {
        let closes: Vec<f64> = (0..500).map(|i| ((i * 37) % 91) as f64).collect();
        let bars = make_bars(&closes);
        let result = Sma::new(200, BarField::Close).compute(&bars);
        for i in 199..500 {
            let window: f64 = closes[i - 199..=i].iter().sum();
            assert_eq!(result[i], window / 200.0, "drift at index {i}");
        }
    }

    #[test]
    fn flat_window_after_decimal_history_is_exact() {
        for seed in 0..50 {
            let closes = decimal_then_flat(seed, 300, 1234.56, 250);
            let bars = make_bars(&closes);
            let fast = Sma::new(20, BarField::Close).compute(&bars);
            let slow = Sma::new(200, BarField::Close).compute(&bars);
            for i in 499..550 {
                assert_eq!(fast[i], 1234.56, "seed {seed} fast at {i}");
                assert_eq!(slow[i], 1234.56, "seed {seed} slow at {i}");
            }
        }
    }

    #[test]
    fn decimal_windows_match_the_mean() {
        let closes = decimal_then_flat(7, 600, 1.0, 0);
        let bars = make_bars(&closes);
        let result = Sma::new(200, BarField::Close).compute(&bars);
        for i in 199..600 {
            let window = &closes[i - 199..=i];
            let expected = window.iter().sum::<f64>() / 200.0;
            assert_approx(result[i], expected, 1e-9);
        }
    }

    #[test]
    fn window_does_not_remember_old_bars() {
        // A window holding the same values yields the same mean whatever came
        // before it.
        let tail = [10.07, 10.13, 9.99, 10.21, 10.05];
        let mut left = vec![1e6, 0.01, 333.33];
        left.extend(tail);
        let mut right = vec![0.3, 0.1, 0.2];
        right.extend(tail);
        let sma = Sma::new(5, BarField::Close);
        let a = sma.compute(&make_bars(&left));
        let b = sma.compute(&make_bars(&right));
        assert_eq!(a[7], b[7]);
    }

    #[test]
    fn lookback() {
        assert_eq!(Sma::new(20, BarField::Close).lookback(), 19);
        assert_eq!(Sma::new(1, BarField::Close).lookback(), 0);
        assert_eq!(Sma::new(200, BarField::Volume).period(), 200);
    }

    #[test]
    fn sma_too_few_bars() {
        let bars = make_bars(&[10.0, 11.0]);
        let result = Sma::new(5, BarField::Close).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
