//! Universe scan: fans symbols out over a bounded worker pool and collects
//! one outcome per symbol.
//!
//! Two entry points:
//! - `run_scan_from_config()`: loads the universe and the CSV store named in
//!   the config. Used by the CLI.
//! - `run_scan()`: takes a parsed universe and any `BarSource`.
//!
//! Per-symbol failures never abort the run; they come back as `Skip`s. Only
//! an unreadable or empty universe, bad parameters, or a failed pool build
//! are errors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crossscan_core::data::universe::SegmentLabels;
use crossscan_core::data::{
    BarSource, CsvBarStore, Listing, RetryingSource, SourceError, Universe, UniverseError,
};
use crossscan_core::fingerprint::{
    config_hash, dataset_hash, series_digest, ConfigHash, DatasetHash,
};
use crossscan_core::{
    ParamError, Pipeline, ScanParams, Segment, Series, SeriesError, Signal, Symbol, SymbolScan,
    SymbolState,
};

use crate::config::{ConfigError, ScanConfig};
use crate::progress::ScanProgress;
use crate::ranking::RankedTables;

/// Current schema version for the run manifest.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid scan parameters: {0}")]
    Params(#[from] ParamError),
    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Why a symbol produced no scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientHistory,
    DataGap,
    MalformedBar,
    SourceUnavailable,
    TimedOut,
}

impl SkipReason {
    pub const ALL: [SkipReason; 5] = [
        SkipReason::InsufficientHistory,
        SkipReason::DataGap,
        SkipReason::MalformedBar,
        SkipReason::SourceUnavailable,
        SkipReason::TimedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InsufficientHistory => "insufficient_history",
            SkipReason::DataGap => "data_gap",
            SkipReason::MalformedBar => "malformed_bar",
            SkipReason::SourceUnavailable => "source_unavailable",
            SkipReason::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&SourceError> for SkipReason {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::Malformed { .. } => SkipReason::MalformedBar,
            SourceError::NotFound { .. } | SourceError::Unavailable { .. } => {
                SkipReason::SourceUnavailable
            }
        }
    }
}

impl From<&SeriesError> for SkipReason {
    fn from(err: &SeriesError) -> Self {
        match err {
            SeriesError::MalformedBar { .. } => SkipReason::MalformedBar,
            SeriesError::DataGap { .. } => SkipReason::DataGap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skip {
    pub symbol: Symbol,
    pub segment: Segment,
    pub reason: SkipReason,
    pub detail: String,
}

/// What happened to one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Scanned(SymbolScan),
    Skipped(Skip),
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &Symbol {
        match self {
            SymbolOutcome::Scanned(scan) => &scan.symbol,
            SymbolOutcome::Skipped(skip) => &skip.symbol,
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub run_at: DateTime<Utc>,
    pub as_of: Option<NaiveDate>,
    pub params: ScanParams,
    pub top_n: usize,
    pub labels: SegmentLabels,
    /// Symbols selected from the universe.
    pub universe_size: usize,
    /// The selected listings, primary first, each segment by rank.
    pub listings: Vec<Listing>,
    pub dataset_hash: DatasetHash,
    pub config_hash: ConfigHash,
    /// Scanned symbols, ordered by segment then symbol.
    pub scans: Vec<SymbolScan>,
    /// Skipped symbols, ordered by segment then symbol.
    pub skips: Vec<Skip>,
    pub elapsed_ms: u64,
}

impl ScanReport {
    /// Scanned symbols per final state label.
    pub fn state_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for scan in &self.scans {
            *counts.entry(scan.state.label()).or_insert(0) += 1;
        }
        counts
    }

    /// Skipped symbols per reason, every reason present (zero if unseen).
    pub fn skip_counts(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts: BTreeMap<SkipReason, usize> =
            SkipReason::ALL.iter().map(|&r| (r, 0)).collect();
        for skip in &self.skips {
            *counts.entry(skip.reason).or_insert(0) += 1;
        }
        counts
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.scans.iter().filter_map(SymbolScan::signal).collect()
    }

    pub fn tables(&self) -> RankedTables {
        RankedTables::build(&self.scans, &self.listings, &self.labels)
    }
}

/// Load the universe and bar store named in `config` and scan.
pub fn run_scan_from_config(
    config: &ScanConfig,
    progress: &dyn ScanProgress,
) -> Result<ScanReport, RunError> {
    config.validate()?;
    let universe = Universe::from_file(&config.universe)?;
    let source = RetryingSource::new(CsvBarStore::new(&config.data_dir), config.retry);
    run_scan(config, &universe, &source, progress)
}

/// Scan the top `config.top_n` symbols of each segment of `universe`.
pub fn run_scan<S: BarSource>(
    config: &ScanConfig,
    universe: &Universe,
    source: &S,
    progress: &dyn ScanProgress,
) -> Result<ScanReport, RunError> {
    let pipeline = Pipeline::new(config.params)?;
    let listings = universe.select(config.top_n)?;
    let config_hash = config_hash(&(config.params, config.as_of, config.top_n))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency)
        .build()?;

    let started = Instant::now();
    let run_at = Utc::now();
    let deadline = config.timeout().map(|t| started + t);
    let total = listings.len();
    let done = AtomicUsize::new(0);

    info!(
        symbols = total,
        source = source.name(),
        threads = pool.current_num_threads(),
        as_of = ?config.as_of,
        "scan started"
    );

    let results: Vec<(SymbolOutcome, Option<blake3::Hash>)> = pool.install(|| {
        listings
            .par_iter()
            .map(|listing| {
                let result = if deadline.is_some_and(|d| Instant::now() >= d) {
                    let timed_out = skip(listing, SkipReason::TimedOut, "run deadline passed");
                    (SymbolOutcome::Skipped(timed_out), None)
                } else {
                    scan_symbol(&pipeline, source, listing, config.as_of)
                };
                let index = done.fetch_add(1, Ordering::Relaxed);
                progress.on_symbol_done(index, total, &result.0);
                result
            })
            .collect()
    });

    let mut scans = Vec::new();
    let mut skips = Vec::new();
    let mut digests = Vec::new();
    for (outcome, digest) in results {
        digests.extend(digest);
        match outcome {
            SymbolOutcome::Scanned(scan) => scans.push(scan),
            SymbolOutcome::Skipped(skip) => skips.push(skip),
        }
    }
    scans.sort_by(|a, b| (a.segment, &a.symbol).cmp(&(b.segment, &b.symbol)));
    skips.sort_by(|a, b| (a.segment, &a.symbol).cmp(&(b.segment, &b.symbol)));

    let report = ScanReport {
        run_at,
        as_of: config.as_of,
        params: config.params,
        top_n: config.top_n,
        labels: universe.labels.clone(),
        universe_size: total,
        listings,
        dataset_hash: dataset_hash(digests),
        config_hash,
        scans,
        skips,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    progress.on_batch_complete(&report);
    Ok(report)
}

/// Fetch, validate, cut at `as_of`, and evaluate one symbol.
///
/// Returns the series digest whenever a series was built.
pub fn scan_symbol<S: BarSource + ?Sized>(
    pipeline: &Pipeline,
    source: &S,
    listing: &Listing,
    as_of: Option<NaiveDate>,
) -> (SymbolOutcome, Option<blake3::Hash>) {
    let bars = match source.fetch(&listing.symbol) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(
                symbol = %listing.symbol,
                segment = %listing.segment,
                error = %e,
                "fetch failed, skipping"
            );
            return (
                SymbolOutcome::Skipped(skip(listing, SkipReason::from(&e), &e.to_string())),
                None,
            );
        }
    };

    let series = match Series::new(listing.symbol.clone(), listing.segment, bars) {
        Ok(series) => series,
        Err(e) => {
            warn!(
                symbol = %listing.symbol,
                segment = %listing.segment,
                error = %e,
                "invalid series, skipping"
            );
            return (
                SymbolOutcome::Skipped(skip(listing, SkipReason::from(&e), &e.to_string())),
                None,
            );
        }
    };
    let series = match as_of {
        Some(date) => series.truncated(date),
        None => series,
    };

    let digest = series_digest(&series);
    let scan = pipeline.evaluate(&series);

    let outcome = match scan.state {
        SymbolState::NoData { bars, required } => {
            warn!(symbol = %listing.symbol, bars, required, "insufficient history, skipping");
            SymbolOutcome::Skipped(skip(
                listing,
                SkipReason::InsufficientHistory,
                &format!("{bars} bars, {required} required"),
            ))
        }
        _ => SymbolOutcome::Scanned(scan),
    };
    (outcome, Some(digest))
}

fn skip(listing: &Listing, reason: SkipReason, detail: &str) -> Skip {
    Skip {
        symbol: listing.symbol.clone(),
        segment: listing.segment,
        reason,
        detail: detail.to_string(),
    }
}
