//! Scan parameters: moving-average windows and the stage windows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Windows that drive the three scan stages.
///
/// All lengths are in trading days (bars), never calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanParams {
    /// Fast moving-average window for price and volume.
    pub fast_window: usize,
    /// Slow moving-average window for price and volume.
    pub slow_window: usize,
    /// First bar after the cross that may count as a pullback touch.
    pub pullback_min: usize,
    /// Last bar after the cross that may count as a pullback touch.
    pub pullback_max: usize,
    /// Optional bound on how many bars after the touch a breakout may occur.
    /// `None` scans to the end of the series.
    pub breakout_window: Option<usize>,
    /// Optional bound on how far back from the last bar the cross may lie.
    /// `None` accepts a cross anywhere in the indicator history.
    pub cross_lookback: Option<usize>,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            fast_window: 20,
            slow_window: 200,
            pullback_min: 3,
            pullback_max: 10,
            breakout_window: None,
            cross_lookback: None,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.fast_window < 1 {
            return Err(ParamError::ZeroWindow("fast_window"));
        }
        if self.slow_window <= self.fast_window {
            return Err(ParamError::SlowNotAboveFast {
                fast: self.fast_window,
                slow: self.slow_window,
            });
        }
        if self.pullback_min < 1 || self.pullback_min > self.pullback_max {
            return Err(ParamError::PullbackRange {
                min: self.pullback_min,
                max: self.pullback_max,
            });
        }
        if self.breakout_window == Some(0) {
            return Err(ParamError::ZeroWindow("breakout_window"));
        }
        if self.cross_lookback == Some(0) {
            return Err(ParamError::ZeroWindow("cross_lookback"));
        }
        Ok(())
    }

    /// Bars a series needs before it is scanned at all: the slow window, the
    /// pullback window, and one bar of breakout look-ahead.
    pub fn min_history(&self) -> usize {
        self.slow_window + self.pullback_max + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{0} must be at least 1")]
    ZeroWindow(&'static str),

    #[error("slow_window ({slow}) must be greater than fast_window ({fast})")]
    SlowNotAboveFast { fast: usize, slow: usize },

    #[error("pullback window {min}..={max} is invalid (need 1 <= min <= max)")]
    PullbackRange { min: usize, max: usize },
}
