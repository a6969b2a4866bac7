//! Result export: per-segment CSV tables and the JSON run manifest.
//!
//! Layout in the output directory, per segment label:
//! - `{label}_signals.csv`: symbol, name, rank, segment, cross_date,
//!   touch_date, signal_date, signal_close
//! - `{label}_crosses.csv`: symbol, name, rank, segment, cross_date,
//!   touch_date, last_close
//! - `{label}_price_crosses.csv` and `{label}_volume_crosses.csv`: symbol,
//!   name, rank, segment, cross_date, last_close
//!
//! plus one `manifest.json`. Missing names, ranks and touch dates are empty.
//!
//! Floats are written with `f64`'s `Display`, the shortest string that
//! parses back to the same value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crossscan_core::ScanParams;

use crate::ranking::{CrossRow, RankedTables, SignalRow, SingleCrossRow};
use crate::runner::{ScanReport, SkipReason, SCHEMA_VERSION};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Written alongside the tables so a run can be identified and compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub run_at: DateTime<Utc>,
    pub as_of: Option<NaiveDate>,
    pub params: ScanParams,
    pub top_n: usize,
    pub universe_size: usize,
    pub dataset_hash: String,
    pub config_hash: String,
    pub state_counts: BTreeMap<String, usize>,
    pub skip_counts: BTreeMap<SkipReason, usize>,
    pub signal_count: usize,
    pub cross_count: usize,
    pub price_cross_count: usize,
    pub volume_cross_count: usize,
    pub files: Vec<String>,
    pub elapsed_ms: u64,
}

impl Manifest {
    pub fn new(report: &ScanReport, tables: &RankedTables, files: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_at: report.run_at,
            as_of: report.as_of,
            params: report.params,
            top_n: report.top_n,
            universe_size: report.universe_size,
            dataset_hash: report.dataset_hash.to_string(),
            config_hash: report.config_hash.to_string(),
            state_counts: report
                .state_counts()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            skip_counts: report.skip_counts(),
            signal_count: tables.signal_count(),
            cross_count: tables.cross_count(),
            price_cross_count: tables.price_cross_count(),
            volume_cross_count: tables.volume_cross_count(),
            files,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Signal table for one segment.
pub fn export_signals_csv(signals: &[SignalRow], label: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "name",
        "rank",
        "segment",
        "cross_date",
        "touch_date",
        "signal_date",
        "signal_close",
    ])?;

    for s in signals {
        wtr.write_record([
            s.symbol.as_str(),
            s.name.as_deref().unwrap_or_default(),
            opt_string(s.rank).as_str(),
            label,
            s.cross_date.to_string().as_str(),
            s.touch_date.to_string().as_str(),
            s.signal_date.to_string().as_str(),
            s.signal_close.to_string().as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Pending-cross table for one segment. `touch_date` is empty when no touch
/// has happened yet.
pub fn export_crosses_csv(crosses: &[CrossRow], label: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "name",
        "rank",
        "segment",
        "cross_date",
        "touch_date",
        "last_close",
    ])?;

    for c in crosses {
        wtr.write_record([
            c.symbol.as_str(),
            c.name.as_deref().unwrap_or_default(),
            opt_string(c.rank).as_str(),
            label,
            c.cross_date.to_string().as_str(),
            opt_string(c.touch_date).as_str(),
            c.last_close.to_string().as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Price-only or volume-only cross table for one segment.
pub fn export_single_crosses_csv(rows: &[SingleCrossRow], label: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "name",
        "rank",
        "segment",
        "cross_date",
        "last_close",
    ])?;

    for r in rows {
        wtr.write_record([
            r.symbol.as_str(),
            r.name.as_deref().unwrap_or_default(),
            opt_string(r.rank).as_str(),
            label,
            r.cross_date.to_string().as_str(),
            r.last_close.to_string().as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Output directory ───────────────────────────────────────────────

/// Write every table and the manifest into `dir`, returning the paths in
/// write order (manifest last).
pub fn write_outputs(report: &ScanReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let tables = report.tables();
    let mut paths = Vec::new();
    let mut write = |file: String, contents: String| -> Result<()> {
        let path = dir.join(file);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        paths.push(path);
        Ok(())
    };

    for seg in &tables.segments {
        let label = seg.label.as_str();
        write(
            format!("{label}_signals.csv"),
            export_signals_csv(&seg.signals, label)?,
        )?;
        write(
            format!("{label}_crosses.csv"),
            export_crosses_csv(&seg.crosses, label)?,
        )?;
        write(
            format!("{label}_price_crosses.csv"),
            export_single_crosses_csv(&seg.price_crosses, label)?,
        )?;
        write(
            format!("{label}_volume_crosses.csv"),
            export_single_crosses_csv(&seg.volume_crosses, label)?,
        )?;
    }

    let files = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    let manifest = Manifest::new(report, &tables, files);
    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, export_manifest(&manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;
    paths.push(manifest_path);

    Ok(paths)
}

// ─── JSON manifest ──────────────────────────────────────────────────

pub fn export_manifest(manifest: &Manifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize manifest to JSON")
}

/// Parse a manifest, rejecting unknown schema versions.
pub fn import_manifest(json: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_json::from_str(json).context("failed to deserialize manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}
