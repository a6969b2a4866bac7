//! Per-symbol scan: indicators → cross → pullback → breakout.
//!
//! Each symbol walks the state machine
//! `NoData → HasIndicators → Crossed → Touched → Signaled` and stops at the
//! first stage that does not hold. `Crossed` and `Touched` are pending states:
//! nothing is carried to the next run, which re-evaluates from scratch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::breakout::{Breakout, BreakoutConfirmer};
use super::cross::{Cross, CrossDetector};
use super::pullback::{PullbackScanner, Touch};
use crate::domain::{CrossEvent, Segment, Series, Signal, Symbol};
use crate::indicators::{IndicatorEngine, IndicatorSeries};
use crate::params::{ParamError, ScanParams};

/// Furthest stage a symbol reached in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SymbolState {
    /// Too little history to scan.
    NoData { bars: usize, required: usize },
    /// Indicators computed, no co-occurring cross.
    HasIndicators,
    /// Crossed, no touch in the pullback window.
    Crossed { cross: Cross },
    /// Touched, no breakout yet.
    Touched { cross: Cross, touch: Touch },
    /// Full chain confirmed.
    Signaled {
        cross: Cross,
        touch: Touch,
        breakout: Breakout,
    },
}

impl SymbolState {
    pub fn label(&self) -> &'static str {
        match self {
            SymbolState::NoData { .. } => "no_data",
            SymbolState::HasIndicators => "has_indicators",
            SymbolState::Crossed { .. } => "crossed",
            SymbolState::Touched { .. } => "touched",
            SymbolState::Signaled { .. } => "signaled",
        }
    }

    /// Crossed or touched, waiting on a later stage.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SymbolState::Crossed { .. } | SymbolState::Touched { .. }
        )
    }

    pub fn cross(&self) -> Option<&Cross> {
        match self {
            SymbolState::Crossed { cross }
            | SymbolState::Touched { cross, .. }
            | SymbolState::Signaled { cross, .. } => Some(cross),
            _ => None,
        }
    }

    pub fn touch(&self) -> Option<&Touch> {
        match self {
            SymbolState::Touched { touch, .. } | SymbolState::Signaled { touch, .. } => {
                Some(touch)
            }
            _ => None,
        }
    }

    pub fn breakout(&self) -> Option<&Breakout> {
        match self {
            SymbolState::Signaled { breakout, .. } => Some(breakout),
            _ => None,
        }
    }
}

/// Outcome of scanning one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolScan {
    pub symbol: Symbol,
    pub segment: Segment,
    pub bars: usize,
    /// Close of the last bar scanned.
    pub last_close: Option<f64>,
    /// Latest price-only golden cross, whatever volume did.
    pub price_cross: Option<Cross>,
    /// Latest volume-only golden cross, whatever price did.
    pub volume_cross: Option<Cross>,
    pub state: SymbolState,
}

impl SymbolScan {
    pub fn cross_event(&self) -> Option<CrossEvent> {
        self.state.cross().map(|cross| CrossEvent {
            symbol: self.symbol.clone(),
            segment: self.segment,
            cross_date: cross.date,
        })
    }

    pub fn signal(&self) -> Option<Signal> {
        match &self.state {
            SymbolState::Signaled {
                cross,
                touch,
                breakout,
            } => Some(Signal {
                symbol: self.symbol.clone(),
                segment: self.segment,
                cross_date: cross.date,
                touch_date: touch.date,
                signal_date: breakout.date,
                signal_close: breakout.close,
            }),
            _ => None,
        }
    }
}

/// The configured stage chain, shared read-only across worker threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: ScanParams,
    engine: IndicatorEngine,
    detector: CrossDetector,
    pullback: PullbackScanner,
    breakout: BreakoutConfirmer,
}

impl Pipeline {
    pub fn new(params: ScanParams) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self {
            params,
            engine: IndicatorEngine::from_params(&params),
            detector: CrossDetector::new(params.cross_lookback),
            pullback: PullbackScanner::new(params.pullback_min, params.pullback_max),
            breakout: BreakoutConfirmer::new(params.breakout_window),
        })
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// Run every stage on `series`. Pure: the same series always yields the
    /// same scan.
    pub fn evaluate(&self, series: &Series) -> SymbolScan {
        let indicators = if series.len() >= self.params.min_history() {
            self.engine.compute(series.bars())
        } else {
            IndicatorSeries::default()
        };
        let state = self.advance(series, &indicators);
        let price_cross = self.detector.latest_price_cross(&indicators, series.len());
        let volume_cross = self.detector.latest_volume_cross(&indicators, series.len());

        debug!(
            symbol = %series.symbol(),
            segment = %series.segment(),
            bars = series.len(),
            state = state.label(),
            "symbol scanned"
        );

        SymbolScan {
            symbol: series.symbol().clone(),
            segment: series.segment(),
            bars: series.len(),
            last_close: series.last().map(|bar| bar.close),
            price_cross,
            volume_cross,
            state,
        }
    }

    fn advance(&self, series: &Series, indicators: &IndicatorSeries) -> SymbolState {
        let bars = series.bars();
        if bars.len() < self.params.min_history() || indicators.is_empty() {
            return SymbolState::NoData {
                bars: bars.len(),
                required: self.params.min_history(),
            };
        }

        let Some(cross) = self.detector.latest(indicators, bars.len()) else {
            return SymbolState::HasIndicators;
        };

        let Some(touch) = self.pullback.scan(bars, indicators, &cross) else {
            return SymbolState::Crossed { cross };
        };

        match self.breakout.scan(bars, touch.index) {
            Some(breakout) => SymbolState::Signaled {
                cross,
                touch,
                breakout,
            },
            None => SymbolState::Touched { cross, touch },
        }
    }
}
