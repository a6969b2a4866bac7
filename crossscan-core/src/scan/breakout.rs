//! Breakout confirmation after a pullback touch.
//!
//! The breakout bar is bullish (close above its own open) and closes above
//! the previous bar's high.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
}

/// Whether `bars[index]` is a breakout bar relative to `bars[index - 1]`.
pub fn is_breakout_bar(bars: &[Bar], index: usize) -> bool {
    if index == 0 || index >= bars.len() {
        return false;
    }
    let bar = &bars[index];
    bar.is_bullish() && bar.close > bars[index - 1].high
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutConfirmer {
    window: Option<usize>,
}

impl BreakoutConfirmer {
    /// `window` caps the scan at N bars after the touch; `None` scans to the
    /// end of the series.
    pub fn new(window: Option<usize>) -> Self {
        Self { window }
    }

    /// First breakout bar strictly after `touch_index`.
    pub fn scan(&self, bars: &[Bar], touch_index: usize) -> Option<Breakout> {
        let last = bars.len().checked_sub(1)?;
        let end = match self.window {
            Some(window) => (touch_index + window).min(last),
            None => last,
        };

        ((touch_index + 1)..=end)
            .find(|&i| is_breakout_bar(bars, i))
            .map(|i| Breakout {
                index: i,
                date: bars[i].date,
                close: bars[i].close,
            })
    }
}
