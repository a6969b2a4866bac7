//! Result records produced by the scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Segment, Symbol};

/// The most recent co-occurring price and volume golden cross of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossEvent {
    pub symbol: Symbol,
    pub segment: Segment,
    pub cross_date: NaiveDate,
}

/// Full chain from cross through pullback to confirmed breakout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: Symbol,
    pub segment: Segment,
    pub cross_date: NaiveDate,
    pub touch_date: NaiveDate,
    pub signal_date: NaiveDate,
    pub signal_close: f64,
}
