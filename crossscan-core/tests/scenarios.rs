//! End-to-end scans of hand-built series.
//!
//! Most scenarios use small windows (fast 2, slow 4) with integer or half
//! prices so every average is exact. The last group runs the default 20/200
//! windows after a stretch of two-decimal prices.
//!
//! Base layout (20 bars):
//! - bars 0..=9 close 10, volume 1000
//! - bar 10 close 14, volume 3000 from here on: price and volume cross together
//! - bars 11..=14 climb to 18, bar 15 closes at 17 == its slow average (touch)
//! - bars 16, 17 flat at 16, bar 18 opens 16 and closes 18 above 16.5 (breakout)

use chrono::{Duration, NaiveDate};
use crossscan_core::indicators::IndicatorEngine;
use crossscan_core::scan::CrossDetector;
use crossscan_core::{Bar, Pipeline, ScanParams, Segment, Series, Symbol, SymbolState};

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap() + Duration::days(i as i64)
}

fn bar(i: usize, open: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: date(i),
        open,
        high: open.max(close) + 0.5,
        low: open.min(close) - 0.5,
        close,
        volume,
    }
}

fn flat(i: usize, close: f64) -> Bar {
    let volume = if i < 10 { 1000.0 } else { 3000.0 };
    bar(i, close, close, volume)
}

fn base_bars() -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..10).map(|i| flat(i, 10.0)).collect();
    for (i, close) in [(10, 14.0), (11, 15.0), (12, 16.0), (13, 17.0), (14, 18.0)] {
        bars.push(flat(i, close));
    }
    bars.push(flat(15, 17.0));
    bars.push(flat(16, 16.0));
    bars.push(flat(17, 16.0));
    bars.push(bar(18, 16.0, 18.0, 3000.0));
    bars.push(flat(19, 18.0));
    bars
}

fn params() -> ScanParams {
    ScanParams {
        fast_window: 2,
        slow_window: 4,
        ..ScanParams::default()
    }
}

fn series(bars: Vec<Bar>) -> Series {
    Series::new(Symbol::new("TEST"), Segment::Primary, bars).unwrap()
}

#[test]
fn full_chain_produces_a_signal() {
    let pipeline = Pipeline::new(params()).unwrap();
    let scan = pipeline.evaluate(&series(base_bars()));

    let signal = scan.signal().expect("expected a signal");
    assert_eq!(signal.cross_date, date(10));
    assert_eq!(signal.touch_date, date(15));
    assert_eq!(signal.signal_date, date(18));
    assert_eq!(signal.signal_close, 18.0);
    assert_eq!(scan.last_close, Some(18.0));

    match scan.state {
        SymbolState::Signaled { touch, .. } => assert_eq!(touch.close, touch.slow_price_ma),
        other => panic!("expected Signaled, got {other:?}"),
    }
}

#[test]
fn cross_bar_satisfies_the_transition() {
    let bars = base_bars();
    let indicators = IndicatorEngine::new(2, 4).compute(&bars);
    let cross = CrossDetector::default().latest(&indicators, bars.len()).unwrap();

    let prev = indicators.at(cross.index - 1).unwrap();
    let curr = indicators.at(cross.index).unwrap();
    assert!(prev.fast_price_ma <= prev.slow_price_ma);
    assert!(prev.fast_vol_ma <= prev.slow_vol_ma);
    assert!(curr.fast_price_ma > curr.slow_price_ma);
    assert!(curr.fast_vol_ma > curr.slow_vol_ma);
}

#[test]
fn later_price_only_cross_does_not_replace_the_event() {
    // Bar 18 crosses price again, but volume averages are flat by then.
    let bars = base_bars();
    let indicators = IndicatorEngine::new(2, 4).compute(&bars);
    let detector = CrossDetector::default();
    let n = bars.len();
    assert_eq!(detector.latest_price_cross(&indicators, n).unwrap().index, 18);
    assert_eq!(detector.latest_volume_cross(&indicators, n).unwrap().index, 10);
    assert_eq!(detector.latest(&indicators, n).unwrap().index, 10);
}

#[test]
fn no_touch_in_window_stays_crossed() {
    let mut bars: Vec<Bar> = (0..10).map(|i| flat(i, 10.0)).collect();
    bars.extend((10..25).map(|i| flat(i, 4.0 + i as f64)));

    let scan = Pipeline::new(params()).unwrap().evaluate(&series(bars));
    match scan.state {
        SymbolState::Crossed { cross } => assert_eq!(cross.date, date(10)),
        other => panic!("expected Crossed, got {other:?}"),
    }
    assert!(scan.state.is_pending());
    assert!(scan.signal().is_none());
    assert_eq!(scan.cross_event().unwrap().cross_date, date(10));
}

#[test]
fn touch_without_breakout_stays_touched() {
    let mut bars = base_bars();
    bars.truncate(16);
    bars.extend((16..20).map(|i| flat(i, 16.0)));

    let scan = Pipeline::new(params()).unwrap().evaluate(&series(bars));
    match scan.state {
        SymbolState::Touched { cross, touch } => {
            assert_eq!(cross.date, date(10));
            assert_eq!(touch.date, date(15));
        }
        other => panic!("expected Touched, got {other:?}"),
    }
    assert!(scan.signal().is_none());
}

#[test]
fn as_of_before_breakout_leaves_touch_pending() {
    let truncated = series(base_bars()).truncated(date(17));
    assert_eq!(truncated.len(), 18);

    let scan = Pipeline::new(params()).unwrap().evaluate(&truncated);
    assert_eq!(scan.state.label(), "touched");
    assert_eq!(scan.last_close, Some(16.0));
}

#[test]
fn breakout_window_bounds_the_confirmation() {
    let bars = base_bars();
    let short = Pipeline::new(ScanParams {
        breakout_window: Some(2),
        ..params()
    })
    .unwrap();
    assert_eq!(short.evaluate(&series(bars.clone())).state.label(), "touched");

    let enough = Pipeline::new(ScanParams {
        breakout_window: Some(3),
        ..params()
    })
    .unwrap();
    assert_eq!(enough.evaluate(&series(bars)).state.label(), "signaled");
}

#[test]
fn cross_lookback_excludes_old_crosses() {
    let pipeline = Pipeline::new(ScanParams {
        cross_lookback: Some(5),
        ..params()
    })
    .unwrap();
    assert_eq!(
        pipeline.evaluate(&series(base_bars())).state,
        SymbolState::HasIndicators
    );
}

#[test]
fn one_bar_short_of_minimum_history_is_no_data() {
    let mut bars = base_bars();
    bars.truncate(14);
    let scan = Pipeline::new(params()).unwrap().evaluate(&series(bars));
    assert_eq!(
        scan.state,
        SymbolState::NoData {
            bars: 14,
            required: 15
        }
    );
}

#[test]
fn series_shorter_than_slow_window_has_no_indicators() {
    let bars: Vec<Bar> = (0..3).map(|i| flat(i, 10.0)).collect();
    assert!(IndicatorEngine::new(2, 4).compute(&bars).is_empty());
}

#[test]
fn rescanning_is_idempotent() {
    let pipeline = Pipeline::new(params()).unwrap();
    let s = series(base_bars());
    assert_eq!(pipeline.evaluate(&s), pipeline.evaluate(&s));
}

// ── Default windows (20 / 200) ───────────────────────────────────────

/// Two-decimal random walk for bars `0..len`, volume 1000.
fn decimal_walk(len: usize) -> Vec<Bar> {
    let mut state = 0x5eed_u64;
    let mut cents: i64 = 120_000;
    (0..len)
        .map(|i| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            cents = (cents + (state >> 33) as i64 % 301 - 150).max(100);
            let close = cents as f64 / 100.0;
            bar(i, close, close, 1000.0)
        })
        .collect()
}

/// Default-window layout (560 bars):
/// - bars 0..=299: two-decimal random walk, volume 1000
/// - bars 300..=549: flat at 1234.5
/// - bar 550 closes 1244.5 with volume 3000 from here on (cross)
/// - bars 551..=553 at 1244.5, bar 554 at 1244.25
/// - bar 555 closes 1234.75, exactly its slow average (touch at offset 5)
/// - bars 556, 557 flat, bar 558 opens 1234.5 and closes 1236 (breakout)
fn default_window_bars() -> Vec<Bar> {
    let surge = |i: usize, open: f64, close: f64| bar(i, open, close, 3000.0);
    let mut bars = decimal_walk(300);
    bars.extend((300..550).map(|i| bar(i, 1234.5, 1234.5, 1000.0)));
    for (i, close) in [(550, 1244.5), (551, 1244.5), (552, 1244.5), (553, 1244.5)] {
        bars.push(surge(i, close, close));
    }
    bars.push(surge(554, 1244.25, 1244.25));
    bars.push(surge(555, 1234.75, 1234.75));
    bars.push(surge(556, 1234.75, 1234.75));
    bars.push(surge(557, 1234.75, 1234.75));
    bars.push(surge(558, 1234.5, 1236.0));
    bars.push(surge(559, 1236.0, 1236.0));
    bars
}

#[test]
fn default_windows_signal_with_touch_on_equality() {
    let params = ScanParams::default();
    assert_eq!(params.min_history(), 211);

    let scan = Pipeline::new(params)
        .unwrap()
        .evaluate(&series(default_window_bars()));

    let signal = scan.signal().expect("expected a signal");
    assert_eq!(signal.cross_date, date(550));
    assert_eq!(signal.touch_date, date(555));
    assert_eq!(signal.signal_date, date(558));
    assert_eq!(signal.signal_close, 1236.0);

    match scan.state {
        SymbolState::Signaled { touch, .. } => {
            assert_eq!(touch.close, 1234.75);
            assert_eq!(touch.slow_price_ma, 1234.75);
        }
        other => panic!("expected Signaled, got {other:?}"),
    }
}

#[test]
fn default_windows_equal_averages_are_not_a_cross() {
    // Flat prices after decimal history, then a volume surge on the last bar:
    // volume crosses but the price averages stay equal.
    let mut bars = decimal_walk(300);
    bars.extend((300..549).map(|i| bar(i, 1234.56, 1234.56, 1000.0)));
    bars.push(bar(549, 1234.56, 1234.56, 9000.0));

    let indicators = IndicatorEngine::new(20, 200).compute(&bars);
    let last = indicators.at(549).unwrap();
    assert_eq!(last.fast_price_ma, 1234.56);
    assert_eq!(last.slow_price_ma, 1234.56);
    assert!(last.fast_vol_ma > last.slow_vol_ma);

    let scan = Pipeline::new(ScanParams::default())
        .unwrap()
        .evaluate(&series(bars));
    assert_eq!(scan.state, SymbolState::HasIndicators);
}
