//! Ranked result tables, four per segment.
//!
//! - signals: symbols that reached a breakout, by signal date
//! - crosses: symbols still pending after the joint cross (crossed or
//!   touched), by cross date
//! - price crosses / volume crosses: the latest single-average cross of every
//!   scanned symbol, by cross date
//!
//! All sort newest first, ties by symbol ascending. Rows carry the listing's
//! name and market-cap rank.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crossscan_core::data::universe::SegmentLabels;
use crossscan_core::data::Listing;
use crossscan_core::scan::Cross;
use crossscan_core::{Segment, Symbol, SymbolScan};

/// A confirmed signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub rank: Option<usize>,
    pub segment: Segment,
    pub cross_date: NaiveDate,
    pub touch_date: NaiveDate,
    pub signal_date: NaiveDate,
    pub signal_close: f64,
}

/// A pending cross: no signal yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRow {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub rank: Option<usize>,
    pub segment: Segment,
    pub cross_date: NaiveDate,
    /// Set once a pullback touch has been seen.
    pub touch_date: Option<NaiveDate>,
    pub last_close: f64,
}

/// Latest cross of one average pair (price or volume) on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleCrossRow {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub rank: Option<usize>,
    pub segment: Segment,
    pub cross_date: NaiveDate,
    pub last_close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTables {
    pub segment: Segment,
    pub label: String,
    pub signals: Vec<SignalRow>,
    pub crosses: Vec<CrossRow>,
    pub price_crosses: Vec<SingleCrossRow>,
    pub volume_crosses: Vec<SingleCrossRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTables {
    /// One entry per segment, primary first.
    pub segments: Vec<SegmentTables>,
}

impl RankedTables {
    /// `listings` supply name and rank; a scan without a listing gets neither.
    pub fn build(scans: &[SymbolScan], listings: &[Listing], labels: &SegmentLabels) -> Self {
        let by_symbol: HashMap<&Symbol, &Listing> =
            listings.iter().map(|l| (&l.symbol, l)).collect();
        let listing_of = |symbol: &Symbol| {
            by_symbol
                .get(symbol)
                .map_or((None, None), |l| (l.name.clone(), Some(l.rank)))
        };

        let segments = Segment::ALL
            .into_iter()
            .map(|segment| {
                let in_segment = || scans.iter().filter(move |s| s.segment == segment);

                let mut signals: Vec<SignalRow> = in_segment()
                    .filter_map(|s| {
                        let signal = s.signal()?;
                        let (name, rank) = listing_of(&s.symbol);
                        Some(SignalRow {
                            symbol: signal.symbol,
                            name,
                            rank,
                            segment,
                            cross_date: signal.cross_date,
                            touch_date: signal.touch_date,
                            signal_date: signal.signal_date,
                            signal_close: signal.signal_close,
                        })
                    })
                    .collect();
                signals.sort_by(|a, b| {
                    newest_first(a.signal_date, &a.symbol, b.signal_date, &b.symbol)
                });

                let mut crosses: Vec<CrossRow> = in_segment()
                    .filter(|s| s.state.is_pending())
                    .filter_map(|s| {
                        let cross = s.state.cross()?;
                        let (name, rank) = listing_of(&s.symbol);
                        Some(CrossRow {
                            symbol: s.symbol.clone(),
                            name,
                            rank,
                            segment,
                            cross_date: cross.date,
                            touch_date: s.state.touch().map(|t| t.date),
                            last_close: s.last_close?,
                        })
                    })
                    .collect();
                crosses.sort_by(|a, b| {
                    newest_first(a.cross_date, &a.symbol, b.cross_date, &b.symbol)
                });

                let single = |pick: fn(&SymbolScan) -> Option<Cross>| {
                    let mut rows: Vec<SingleCrossRow> = in_segment()
                        .filter_map(|s| {
                            let cross = pick(s)?;
                            let (name, rank) = listing_of(&s.symbol);
                            Some(SingleCrossRow {
                                symbol: s.symbol.clone(),
                                name,
                                rank,
                                segment,
                                cross_date: cross.date,
                                last_close: s.last_close?,
                            })
                        })
                        .collect();
                    rows.sort_by(|a, b| {
                        newest_first(a.cross_date, &a.symbol, b.cross_date, &b.symbol)
                    });
                    rows
                };

                SegmentTables {
                    segment,
                    label: labels.get(segment).to_string(),
                    signals,
                    crosses,
                    price_crosses: single(|s| s.price_cross),
                    volume_crosses: single(|s| s.volume_cross),
                }
            })
            .collect();

        Self { segments }
    }

    pub fn segment(&self, segment: Segment) -> Option<&SegmentTables> {
        self.segments.iter().find(|t| t.segment == segment)
    }

    pub fn signal_count(&self) -> usize {
        self.segments.iter().map(|t| t.signals.len()).sum()
    }

    pub fn cross_count(&self) -> usize {
        self.segments.iter().map(|t| t.crosses.len()).sum()
    }

    pub fn price_cross_count(&self) -> usize {
        self.segments.iter().map(|t| t.price_crosses.len()).sum()
    }

    pub fn volume_cross_count(&self) -> usize {
        self.segments.iter().map(|t| t.volume_crosses.len()).sum()
    }
}

fn newest_first(
    a_date: NaiveDate,
    a_sym: &Symbol,
    b_date: NaiveDate,
    b_sym: &Symbol,
) -> Ordering {
    b_date.cmp(&a_date).then_with(|| a_sym.cmp(b_sym))
}
